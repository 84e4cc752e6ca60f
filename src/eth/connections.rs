//! Resolution of caller-supplied connection descriptors to concrete connections.

use crate::eth::{
    connection::Connection,
    error::{EthError, Result},
    networks::{DEFAULT_GATEWAY_TEMPLATE, KnownNetwork},
    wallet::Wallet,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};
use tracing::debug;

/// Network every resolver falls back to when no default is configured.
pub const MAINNET: &str = "mainnet";

/// Caller hint selecting which connection a call should use.
///
/// An explicit network name or chain ID takes precedence over `node`. Empty strings are
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    /// Explicit node URL
    #[serde(default)]
    pub node: Option<String>,
    /// Configured network key, known network name or decimal chain ID
    #[serde(default)]
    pub network_name_or_chain_id: Option<String>,
}

impl ConnectionDescriptor {
    /// Descriptor selecting a network by name or chain ID.
    pub fn network(network: impl Into<String>) -> Self {
        Self { node: None, network_name_or_chain_id: Some(network.into()) }
    }

    /// Descriptor selecting an explicit node URL.
    pub fn node(node: impl Into<String>) -> Self {
        Self { node: Some(node.into()), network_name_or_chain_id: None }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Normalize a mapping key. Keys are trimmed and case-folded but otherwise stored literally.
pub fn normalize_network_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Returns true if two keys select the same network: equal once normalized, or both naming
/// the same known network.
pub fn same_network(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_network_key(a), normalize_network_key(b));
    if a == b {
        return true;
    }
    matches!(
        (KnownNetwork::lookup(&a), KnownNetwork::lookup(&b)),
        (Some(x), Some(y)) if x == y
    )
}

/// Find the entry a key selects.
///
/// The literal key wins. Otherwise, for a known network, the first entry stored under its
/// canonical name, one of its aliases or its chain ID, in that order.
fn find_entry<'a>(
    connections: &'a HashMap<String, Connection>,
    network: &str,
) -> Option<(&'a str, &'a Connection)> {
    let key = normalize_network_key(network);
    if let Some((key, connection)) = connections.get_key_value(&key) {
        return Some((key.as_str(), connection));
    }

    let known = KnownNetwork::lookup(&key)?;
    std::iter::once(known.name().to_string())
        .chain(known.aliases().iter().map(|alias| alias.to_string()))
        .chain(std::iter::once(known.chain_id().to_string()))
        .find_map(|candidate| connections.get_key_value(&candidate))
        .map(|(key, connection)| (key.as_str(), connection))
}

/// Set of named connections with a default network and an optional resolver-wide signer.
///
/// The mapping is read-only after construction; resolving never inserts into it.
pub struct Connections {
    connections: HashMap<String, Connection>,
    default_network: String,
    default_connection: Connection,
    signer: Option<Arc<dyn Wallet>>,
    gateway_template: String,
}

impl Connections {
    /// Create a resolver from a mapping of network keys to connections.
    ///
    /// If `default_network` is given it must select an entry of `connections`. Otherwise
    /// `mainnet` becomes the default, and a gateway connection is synthesized for it if
    /// the mapping has none. Keys that differ only by case are rejected.
    pub fn new(
        connections: HashMap<String, Connection>,
        default_network: Option<&str>,
        signer: Option<Arc<dyn Wallet>>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut builder = ConnectionsBuilder::new();
        for (network, connection) in connections {
            if !seen.insert(normalize_network_key(&network)) {
                return Err(EthError::DuplicateNetwork(network));
            }
            builder = builder.with_network(&network, connection);
        }
        if let Some(default_network) = default_network {
            builder = builder.with_default_network(default_network);
        }
        if let Some(signer) = signer {
            builder = builder.with_signer(signer);
        }
        builder.build()
    }

    /// Start building a resolver.
    pub fn builder() -> ConnectionsBuilder {
        ConnectionsBuilder::new()
    }

    /// Key of the default network.
    pub fn default_network(&self) -> &str {
        &self.default_network
    }

    /// Stored entry `network` selects, without signer augmentation.
    pub fn get(&self, network: &str) -> Option<&Connection> {
        find_entry(&self.connections, network).map(|(_, connection)| connection)
    }

    /// Keys of all configured networks.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }

    /// Returns true if a resolver-wide signer is configured.
    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Resolve a descriptor to a connection.
    ///
    /// Precedence: no descriptor, then network name or chain ID (configured entry, then
    /// known network), then explicit node, then the default network.
    pub fn resolve(&self, descriptor: Option<&ConnectionDescriptor>) -> Result<Connection> {
        let Some(descriptor) = descriptor else {
            return Ok(self.default_connection());
        };

        if let Some(network) = non_empty(&descriptor.network_name_or_chain_id) {
            return self.resolve_network(network);
        }

        if let Some(node) = non_empty(&descriptor.node) {
            debug!(node = %node, "Creating connection for explicit node");
            return Ok(Connection::from_node(node, self.signer.clone()));
        }

        Ok(self.default_connection())
    }

    fn resolve_network(&self, network: &str) -> Result<Connection> {
        if let Some((key, connection)) = find_entry(&self.connections, network) {
            debug!(network = %network, entry = %key, "Resolved configured network");
            return Ok(self.with_signer(connection));
        }

        let key = normalize_network_key(network);
        let Some(known) = KnownNetwork::lookup(&key) else {
            return Err(EthError::unknown_network(key));
        };

        debug!(network = %known, "Synthesizing transient connection for known network");
        Connection::from_network_with_template(
            known.name(),
            &self.gateway_template,
            self.signer.clone(),
        )
    }

    fn default_connection(&self) -> Connection {
        self.with_signer(&self.default_connection)
    }

    /// Attach the resolver signer to a connection that has none of its own.
    fn with_signer(&self, connection: &Connection) -> Connection {
        match &self.signer {
            Some(signer) if !connection.has_signer() => connection.with_signer(Arc::clone(signer)),
            _ => connection.clone(),
        }
    }
}

impl fmt::Debug for Connections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connections")
            .field("connections", &self.connections)
            .field("default_network", &self.default_network)
            .field("has_signer", &self.has_signer())
            .finish()
    }
}

/// Builder for [`Connections`].
pub struct ConnectionsBuilder {
    connections: HashMap<String, Connection>,
    default_network: Option<String>,
    signer: Option<Arc<dyn Wallet>>,
    gateway_template: String,
}

impl ConnectionsBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            default_network: None,
            signer: None,
            gateway_template: DEFAULT_GATEWAY_TEMPLATE.to_string(),
        }
    }

    /// Register a connection under a network key, replacing any previous entry.
    pub fn with_network(mut self, network: &str, connection: Connection) -> Self {
        self.connections.insert(normalize_network_key(network), connection);
        self
    }

    /// Set the default network key.
    pub fn with_default_network(mut self, network: &str) -> Self {
        self.default_network = Some(network.to_string());
        self
    }

    /// Set the resolver-wide signer used by connections without their own.
    pub fn with_signer(mut self, signer: Arc<dyn Wallet>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Override the `{network}` endpoint template for known networks.
    pub fn with_gateway_template(mut self, template: impl Into<String>) -> Self {
        self.gateway_template = template.into();
        self
    }

    /// Build the resolver, settling the default network.
    pub fn build(mut self) -> Result<Connections> {
        let requested = self.default_network.take();
        let found = find_entry(&self.connections, requested.as_deref().unwrap_or(MAINNET))
            .map(|(key, connection)| (key.to_string(), connection.clone()));

        let (default_network, default_connection) = match (found, requested) {
            (Some(entry), _) => entry,
            (None, Some(network)) => return Err(EthError::InvalidDefaultNetwork(network)),
            (None, None) => {
                debug!("No mainnet connection configured, using gateway default");
                let mainnet =
                    Connection::from_network_with_template(MAINNET, &self.gateway_template, None)?;
                self.connections.insert(MAINNET.to_string(), mainnet.clone());
                (MAINNET.to_string(), mainnet)
            },
        };

        Ok(Connections {
            connections: self.connections,
            default_network,
            default_connection,
            signer: self.signer,
            gateway_template: self.gateway_template,
        })
    }
}

impl Default for ConnectionsBuilder {
    fn default() -> Self {
        Self::new()
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

    fn node(url: &str) -> Connection {
        Connection::from_node(url, None)
    }

    #[test]
    fn test_default_is_configured_mainnet() {
        let connections = Connections::builder()
            .with_network("mainnet", node("http://mainnet.local"))
            .build()
            .unwrap();

        assert_eq!(connections.default_network(), "mainnet");
        assert_eq!(connections.resolve(None).unwrap().endpoint(), "http://mainnet.local");
    }

    #[test]
    fn test_default_synthesized_when_empty() {
        let connections = Connections::builder().build().unwrap();
        let expected = KnownNetwork::Mainnet.endpoint(DEFAULT_GATEWAY_TEMPLATE);

        assert_eq!(connections.default_network(), "mainnet");
        assert_eq!(connections.resolve(None).unwrap().endpoint(), expected);
        assert!(connections.get("mainnet").is_some());
    }

    #[test]
    fn test_explicit_default_must_exist() {
        let err = Connections::builder()
            .with_network("testnet", node("http://testnet.local"))
            .with_default_network("goerli")
            .build()
            .unwrap_err();
        assert!(matches!(err, EthError::InvalidDefaultNetwork(ref n) if n == "goerli"));

        let ok = Connections::builder()
            .with_network("testnet", node("http://testnet.local"))
            .with_default_network("TestNet")
            .build()
            .unwrap();
        assert_eq!(ok.default_network(), "testnet");
    }

    #[test]
    fn test_none_and_empty_descriptor_resolve_to_default() {
        let connections = Connections::builder()
            .with_network("testnet", node("http://testnet.local"))
            .with_default_network("testnet")
            .build()
            .unwrap();

        let empty = ConnectionDescriptor {
            node: Some(String::new()),
            network_name_or_chain_id: Some("  ".to_string()),
        };
        for _ in 0..3 {
            assert_eq!(connections.resolve(None).unwrap().endpoint(), "http://testnet.local");
            assert_eq!(
                connections.resolve(Some(&ConnectionDescriptor::default())).unwrap().endpoint(),
                "http://testnet.local"
            );
            let resolved = connections.resolve(Some(&empty)).unwrap();
            assert_eq!(resolved.endpoint(), "http://testnet.local");
        }
    }

    #[test]
    fn test_network_key_is_case_insensitive() {
        let connections = Connections::builder()
            .with_network("Testnet", node("http://testnet.local"))
            .build()
            .unwrap();

        for key in ["testnet", "TESTNET", "TestNet"] {
            let resolved = connections.resolve(Some(&ConnectionDescriptor::network(key))).unwrap();
            assert_eq!(resolved.endpoint(), "http://testnet.local");
        }
    }

    #[test]
    fn test_chain_id_and_alias_resolve_to_registered_entry() {
        let connections = Connections::builder()
            .with_network("1", node("http://mainnet.local"))
            .build()
            .unwrap();

        assert_eq!(connections.get("mainnet").unwrap().endpoint(), "http://mainnet.local");
        for key in ["1", "mainnet", "Homestead"] {
            let resolved = connections.resolve(Some(&ConnectionDescriptor::network(key))).unwrap();
            assert_eq!(resolved.endpoint(), "http://mainnet.local");
        }
    }

    #[test]
    fn test_literal_chain_id_key_wins_over_canonical_entry() {
        let connections = Connections::builder()
            .with_network("mainnet", node("http://a.local"))
            .with_network("1", node("http://b.local"))
            .build()
            .unwrap();

        let by_id = connections.resolve(Some(&ConnectionDescriptor::network("1"))).unwrap();
        assert_eq!(by_id.endpoint(), "http://b.local");
        for key in ["mainnet", "Homestead"] {
            let resolved = connections.resolve(Some(&ConnectionDescriptor::network(key))).unwrap();
            assert_eq!(resolved.endpoint(), "http://a.local", "key {key}");
        }
        assert_eq!(connections.default_network(), "mainnet");
        assert_eq!(connections.networks().count(), 2);
    }

    #[test]
    fn test_case_folded_duplicate_keys_are_rejected() {
        let mut mapping = HashMap::new();
        mapping.insert("Local".to_string(), node("http://a.local"));
        mapping.insert("local".to_string(), node("http://b.local"));

        let err = Connections::new(mapping, None, None).unwrap_err();
        assert!(matches!(err, EthError::DuplicateNetwork(_)));
    }

    #[test]
    fn test_default_network_selected_by_chain_id_key() {
        let connections = Connections::builder()
            .with_network("5", node("http://goerli.local"))
            .with_default_network("Goerli")
            .build()
            .unwrap();

        assert_eq!(connections.default_network(), "5");
        assert_eq!(connections.resolve(None).unwrap().endpoint(), "http://goerli.local");
    }

    #[test]
    fn test_same_network() {
        assert!(same_network("Mainnet", "1"));
        assert!(same_network("homestead", "mainnet"));
        assert!(same_network("Custom", "custom"));
        assert!(!same_network("mainnet", "goerli"));
        assert!(!same_network("1337", "mainnet"));
    }

    #[test]
    fn test_literal_numeric_key_wins_over_chain_id_decode() {
        let connections = Connections::builder()
            .with_network("1337", node("http://devnet.local"))
            .build()
            .unwrap();

        let resolved = connections.resolve(Some(&ConnectionDescriptor::network("1337"))).unwrap();
        assert_eq!(resolved.endpoint(), "http://devnet.local");
    }

    #[test]
    fn test_known_network_is_synthesized_and_not_cached() {
        let connections = Connections::builder().build().unwrap();

        let by_id = connections.resolve(Some(&ConnectionDescriptor::network("5"))).unwrap();
        let by_name = connections.resolve(Some(&ConnectionDescriptor::network("Goerli"))).unwrap();
        assert_eq!(by_id.endpoint(), by_name.endpoint());
        assert_eq!(by_id.endpoint(), KnownNetwork::Goerli.endpoint(DEFAULT_GATEWAY_TEMPLATE));
        assert!(connections.get("goerli").is_none());
    }

    #[test]
    fn test_gateway_template_override() {
        let connections = Connections::builder()
            .with_gateway_template("https://rpc.example.org/{network}")
            .build()
            .unwrap();

        let resolved =
            connections.resolve(Some(&ConnectionDescriptor::network("sepolia"))).unwrap();
        assert_eq!(resolved.endpoint(), "https://rpc.example.org/sepolia");
        let default = connections.resolve(None).unwrap();
        assert_eq!(default.endpoint(), "https://rpc.example.org/mainnet");
    }

    #[test]
    fn test_unknown_network_lists_chain_ids() {
        let connections = Connections::builder().build().unwrap();
        let err = connections
            .resolve(Some(&ConnectionDescriptor::network("not-a-real-network-xyz")))
            .unwrap_err();

        match err {
            EthError::UnknownNetwork { network, chain_ids } => {
                assert_eq!(network, "not-a-real-network-xyz");
                assert_eq!(chain_ids, KnownNetwork::chain_ids());
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_network_takes_precedence_over_node() {
        let connections = Connections::builder()
            .with_network("testnet", node("http://testnet.local"))
            .build()
            .unwrap();
        let descriptor = ConnectionDescriptor {
            node: Some("http://other.local".to_string()),
            network_name_or_chain_id: Some("testnet".to_string()),
        };

        let resolved = connections.resolve(Some(&descriptor)).unwrap();
        assert_eq!(resolved.endpoint(), "http://testnet.local");
    }

    #[test]
    fn test_node_is_always_fresh_and_signed_by_resolver() {
        let connections = Connections::builder().with_signer(wallet()).build().unwrap();
        let resolved =
            connections.resolve(Some(&ConnectionDescriptor::node("http://node.local"))).unwrap();

        assert_eq!(resolved.endpoint(), "http://node.local");
        assert!(resolved.has_signer());
        assert!(connections.get("http://node.local").is_none());
    }

    #[test]
    fn test_signer_augmentation_does_not_mutate_entry() {
        let connections = Connections::builder()
            .with_network("testnet", node("http://testnet.local"))
            .with_signer(wallet())
            .build()
            .unwrap();

        let resolved =
            connections.resolve(Some(&ConnectionDescriptor::network("testnet"))).unwrap();
        assert!(resolved.has_signer());
        assert!(!connections.get("testnet").unwrap().has_signer());
    }

    #[test]
    fn test_connection_signer_overrides_resolver_signer() {
        let own = LocalWallet::from_private_key(
            "0x6cbed15c793ce57650b9877cf6fa156fbef513c4e6134f022a85b1ffdd59b2a1",
        )
        .unwrap();
        let own_address = own.checksum_address();
        let connections = Connections::builder()
            .with_network(
                "testnet",
                Connection::from_node("http://testnet.local", Some(Arc::new(own))),
            )
            .with_signer(wallet())
            .build()
            .unwrap();

        let resolved =
            connections.resolve(Some(&ConnectionDescriptor::network("testnet"))).unwrap();
        assert_eq!(resolved.signer().unwrap().address().to_checksum(None), own_address);
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let descriptor: ConnectionDescriptor =
            serde_json::from_str(r#"{"node":null,"networkNameOrChainId":"goerli"}"#).unwrap();
        assert_eq!(descriptor, ConnectionDescriptor::network("goerli"));

        let empty: ConnectionDescriptor = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ConnectionDescriptor::default());
    }
}
