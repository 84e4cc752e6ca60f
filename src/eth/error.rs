//! Error types for the Ethereum module.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when resolving connections, signing or talking to a node.
#[derive(Debug, Error)]
pub enum EthError {
    /// The descriptor named a network that is neither configured nor known
    #[error(
        "Network: {network} isn't a known network!\n\tUse one of: {chain_ids:?}\n\tor set a custom RPC URL using the 'node' field."
    )]
    UnknownNetwork {
        /// The (case-folded) key that failed to resolve
        network: String,
        /// Every chain ID the registry knows about
        chain_ids: Vec<u64>,
    },

    /// Two mapping keys differ only by case
    #[error("Network: {0} is configured more than once")]
    DuplicateNetwork(String),

    /// The configured default network has no connection
    #[error("Default network: {0} not in connections")]
    InvalidDefaultNetwork(String),

    /// A signing operation was requested on a connection without a key
    #[error("Signer is not set for this connection")]
    SignerMissing,

    /// Error reported by the node or the transport, passed through verbatim
    #[error("{0}")]
    ProviderError(String),

    /// Confirmation wait exceeded its deadline
    #[error("Transaction {tx_hash} timed out after {elapsed:?}")]
    Timeout {
        /// Hash of the transaction being waited on
        tx_hash: String,
        /// Time spent waiting before giving up
        elapsed: Duration,
    },

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Error with a mnemonic phrase
    #[error("Mnemonic error: {0}")]
    MnemonicError(String),

    /// Error when creating or using a wallet
    #[error("Wallet error: {0}")]
    WalletError(String),

    /// Malformed plugin arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The host asked for a plugin method that does not exist
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EthError {
    /// Build an [`EthError::UnknownNetwork`] listing every known chain ID.
    pub fn unknown_network(network: impl Into<String>) -> Self {
        EthError::UnknownNetwork {
            network: network.into(),
            chain_ids: crate::eth::KnownNetwork::chain_ids(),
        }
    }
}

/// Result type for Ethereum operations
pub type Result<T> = std::result::Result<T, EthError>;
