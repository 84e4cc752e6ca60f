mod config;
mod connection;
mod connections;
mod error;
mod keystore;
mod local;
mod networks;
mod transport;
mod wait;
mod wallet;

pub use config::{NetworkConfig, ProviderConfig, WaitConfig};
pub use connection::Connection;
pub use connections::{
    ConnectionDescriptor, Connections, ConnectionsBuilder, MAINNET, normalize_network_key,
    same_network,
};
pub use error::{EthError, Result};
pub use keystore::{SecretKey, SecureMnemonic};
pub use local::{SEND_TRANSACTION, SIGN_TYPED_DATA, send_transaction, sign_typed_data};
pub use networks::{DEFAULT_GATEWAY_TEMPLATE, KnownNetwork};
pub use transport::{HttpTransport, RpcTransport};
pub use wait::{ConfirmationWaiter, WaitState, parse_quantity};
pub use wallet::{DEFAULT_DERIVATION_PATH, LocalWallet, Wallet};

/// Re-export essential types from alloy-primitives for convenience
pub mod types {
    pub use alloy_primitives::{Address, B256 as TxHash};
}
