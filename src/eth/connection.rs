//! A single node connection with optional signing key.

use crate::eth::{
    error::{EthError, Result},
    networks::{DEFAULT_GATEWAY_TEMPLATE, KnownNetwork},
    transport::{HttpTransport, RpcTransport},
    wallet::Wallet,
};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// An RPC endpoint plus the key used to sign on its behalf, if any.
///
/// Connections are immutable; attaching a signer produces a new value that shares the
/// underlying transport.
#[derive(Clone)]
pub struct Connection {
    endpoint: String,
    transport: Arc<dyn RpcTransport>,
    signer: Option<Arc<dyn Wallet>>,
}

impl Connection {
    /// Create a connection from an already-built transport.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn RpcTransport>,
        signer: Option<Arc<dyn Wallet>>,
    ) -> Self {
        Self { endpoint: endpoint.into(), transport, signer }
    }

    /// Create a connection to a node URL over HTTP.
    ///
    /// The URL is kept verbatim; connectivity problems surface on the first call.
    pub fn from_node(node: &str, signer: Option<Arc<dyn Wallet>>) -> Self {
        Self::new(node, Arc::new(HttpTransport::new(node)), signer)
    }

    /// Create a connection to a known network through the default public gateway.
    pub fn from_network(network: &str, signer: Option<Arc<dyn Wallet>>) -> Result<Self> {
        Self::from_network_with_template(network, DEFAULT_GATEWAY_TEMPLATE, signer)
    }

    /// Create a connection to a known network, deriving the endpoint from `template`.
    pub fn from_network_with_template(
        network: &str,
        template: &str,
        signer: Option<Arc<dyn Wallet>>,
    ) -> Result<Self> {
        let network = KnownNetwork::lookup(network)
            .ok_or_else(|| EthError::unknown_network(network.to_lowercase()))?;

        Ok(Self::from_node(&network.endpoint(template), signer))
    }

    /// The endpoint this connection talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns true if the connection has a signer.
    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// The signing wallet for this connection.
    pub fn signer(&self) -> Result<&Arc<dyn Wallet>> {
        self.signer.as_ref().ok_or(EthError::SignerMissing)
    }

    /// Return a copy of this connection that signs with `signer`.
    pub fn with_signer(&self, signer: Arc<dyn Wallet>) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            transport: Arc::clone(&self.transport),
            signer: Some(signer),
        }
    }

    /// Submit a JSON-RPC call through this connection's transport.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.transport.call(method, params).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("has_signer", &self.has_signer())
            .finish()
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection: {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth::wallet::LocalWallet;

    const KEY: &str = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";

    fn wallet() -> Arc<dyn Wallet> {
        Arc::new(LocalWallet::from_private_key(KEY).unwrap())
    }

    #[test]
    fn test_from_node_keeps_url_verbatim() {
        let connection = Connection::from_node("http://localhost:8545", None);
        assert_eq!(connection.endpoint(), "http://localhost:8545");
        assert!(!connection.has_signer());
        assert!(matches!(connection.signer(), Err(EthError::SignerMissing)));
    }

    #[test]
    fn test_from_network_derives_gateway_endpoint() {
        let by_name = Connection::from_network("sepolia", None).unwrap();
        let by_id = Connection::from_network("11155111", None).unwrap();
        assert_eq!(by_name.endpoint(), by_id.endpoint());
        assert!(by_name.endpoint().starts_with("https://sepolia.infura.io/v3/"));
    }

    #[test]
    fn test_from_network_unknown() {
        let err = Connection::from_network("Atlantis", None).unwrap_err();
        assert!(
            matches!(err, EthError::UnknownNetwork { ref network, .. } if network == "atlantis")
        );
    }

    #[test]
    fn test_with_signer_leaves_original_untouched() {
        let connection = Connection::from_node("http://localhost:8545", None);
        let signed = connection.with_signer(wallet());
        assert!(signed.has_signer());
        assert!(!connection.has_signer());
        assert_eq!(signed.endpoint(), connection.endpoint());
    }
}
