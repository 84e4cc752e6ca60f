//! Secure in-memory holders for signing key material.

use crate::eth::error::{EthError, Result};
use coins_bip39::{English, Mnemonic};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw secp256k1 private key, wiped from memory on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; 32],
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl SecretKey {
    /// Parse a 32-byte hex private key, with or without a `0x` prefix.
    pub fn from_hex(key: &str) -> Result<Self> {
        let key = key.trim();
        let key = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")).unwrap_or(key);

        let mut decoded = hex::decode(key).map_err(|_| EthError::InvalidPrivateKey)?;
        if decoded.len() != 32 {
            decoded.zeroize();
            return Err(EthError::InvalidPrivateKey);
        }

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();

        Ok(Self { bytes })
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Mnemonic phrase wrapper that implements zeroize for secure memory handling
#[derive(ZeroizeOnDrop)]
pub struct SecureMnemonic {
    /// The mnemonic phrase
    phrase: String,
}

impl Zeroize for SecureMnemonic {
    fn zeroize(&mut self) {
        self.phrase.zeroize();
    }
}

impl SecureMnemonic {
    /// Create a new secure mnemonic
    pub fn new(phrase: String) -> Self {
        Self { phrase }
    }

    /// Get the mnemonic phrase
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Validate that the mnemonic phrase is valid
    pub fn validate(&self) -> Result<()> {
        Mnemonic::<English>::new_from_phrase(self.phrase())
            .map_err(|e| EthError::MnemonicError(e.to_string()))?;

        Ok(())
    }
}

impl fmt::Debug for SecureMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureMnemonic(<redacted>)")
    }
}
