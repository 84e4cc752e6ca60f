//! Local signing wallets backed by an in-memory private key.

use crate::eth::{
    error::{EthError, Result},
    keystore::{SecretKey, SecureMnemonic},
};
use alloy_primitives::{Address, B256, Signature, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner};
use coins_bip39::English;
use std::{fmt, sync::Arc};

/// Default account derivation path for Ethereum wallets.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// A wallet trait defining the signing capability a connection exposes.
pub trait Wallet: Send + Sync {
    /// Get the wallet's address
    fn address(&self) -> Address;

    /// Sign a message with EIP-191 personal-sign prefixing, returning `r || s || v`
    fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Sign the keccak256 hash of an RLP-encoded unsigned transaction, returning `r || s || v`
    fn sign_transaction(&self, rlp: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign_hash(&keccak256(rlp))?.as_bytes().to_vec())
    }

    /// Sign a 32-byte prehash without any prefixing
    fn sign_hash(&self, hash: &B256) -> Result<Signature>;
}

/// A wallet holding a secp256k1 key in process memory.
#[derive(Clone)]
pub struct LocalWallet {
    /// The underlying alloy signer
    signer: Arc<PrivateKeySigner>,

    /// The wallet's address
    address: Address,
}

impl LocalWallet {
    /// Create a wallet from a private key.
    pub fn from_secret_key(key: &SecretKey) -> Result<Self> {
        let signer = PrivateKeySigner::from_bytes(&B256::from(*key.as_bytes()))
            .map_err(|_| EthError::InvalidPrivateKey)?;

        Ok(Self::from_signer(signer))
    }

    /// Create a wallet from a hex-encoded private key.
    pub fn from_private_key(key: &str) -> Result<Self> {
        Self::from_secret_key(&SecretKey::from_hex(key)?)
    }

    /// Create a new wallet from a mnemonic phrase with a given derivation path.
    pub fn from_mnemonic(mnemonic: &SecureMnemonic, derivation_path: &str) -> Result<Self> {
        mnemonic.validate()?;

        let signer = MnemonicBuilder::<English>::default()
            .phrase(mnemonic.phrase())
            .derivation_path(derivation_path)
            .map_err(|e| EthError::WalletError(format!("Invalid derivation path: {}", e)))?
            .build()
            .map_err(|e| EthError::WalletError(e.to_string()))?;

        Ok(Self::from_signer(signer))
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self { signer: Arc::new(signer), address }
    }

    /// EIP-55 checksummed address string.
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }
}

impl Wallet for LocalWallet {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .signer
            .sign_message_sync(message)
            .map_err(|e| EthError::WalletError(e.to_string()))?;

        Ok(signature.as_bytes().to_vec())
    }

    fn sign_hash(&self, hash: &B256) -> Result<Signature> {
        self.signer.sign_hash_sync(hash).map_err(|e| EthError::WalletError(e.to_string()))
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet").field("address", &self.address).finish_non_exhaustive()
    }
}
