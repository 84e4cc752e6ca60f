//! Static registry of well-known EVM networks.

use std::fmt;

/// Gateway used to derive an endpoint for a known network when no node URL is configured.
///
/// Deployments are expected to override this (or configure an explicit node per network);
/// `{network}` is replaced with the canonical network name.
pub const DEFAULT_GATEWAY_TEMPLATE: &str =
    "https://{network}.infura.io/v3/1a8e6a8ab1df44ccb77d3e954082c5d4";

/// Networks with a public gateway endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownNetwork {
    /// Ethereum mainnet
    Mainnet,
    /// Goerli testnet
    Goerli,
    /// Sepolia testnet
    Sepolia,
    /// Celo mainnet
    CeloMainnet,
    /// Celo Alfajores testnet
    CeloAlfajores,
    /// Avalanche C-Chain
    AvalancheMainnet,
    /// Avalanche Fuji testnet
    AvalancheFuji,
    /// Palm mainnet
    PalmMainnet,
    /// Palm testnet
    PalmTestnet,
    /// Aurora mainnet
    AuroraMainnet,
    /// Aurora testnet
    AuroraTestnet,
}

impl KnownNetwork {
    /// Every known network, in chain-id listing order.
    pub const ALL: [KnownNetwork; 11] = [
        KnownNetwork::Mainnet,
        KnownNetwork::Goerli,
        KnownNetwork::Sepolia,
        KnownNetwork::CeloMainnet,
        KnownNetwork::CeloAlfajores,
        KnownNetwork::AvalancheMainnet,
        KnownNetwork::AvalancheFuji,
        KnownNetwork::PalmMainnet,
        KnownNetwork::PalmTestnet,
        KnownNetwork::AuroraMainnet,
        KnownNetwork::AuroraTestnet,
    ];

    /// Get the chain ID for this network
    pub fn chain_id(&self) -> u64 {
        match self {
            KnownNetwork::Mainnet => 1,
            KnownNetwork::Goerli => 5,
            KnownNetwork::Sepolia => 11155111,
            KnownNetwork::CeloMainnet => 42220,
            KnownNetwork::CeloAlfajores => 44787,
            KnownNetwork::AvalancheMainnet => 43114,
            KnownNetwork::AvalancheFuji => 43113,
            KnownNetwork::PalmMainnet => 11297108109,
            KnownNetwork::PalmTestnet => 11297108099,
            KnownNetwork::AuroraMainnet => 1313161554,
            KnownNetwork::AuroraTestnet => 1313161555,
        }
    }

    /// Get the canonical network name
    pub fn name(&self) -> &'static str {
        match self {
            KnownNetwork::Mainnet => "mainnet",
            KnownNetwork::Goerli => "goerli",
            KnownNetwork::Sepolia => "sepolia",
            KnownNetwork::CeloMainnet => "celo-mainnet",
            KnownNetwork::CeloAlfajores => "celo-alfajores",
            KnownNetwork::AvalancheMainnet => "avalanche-mainnet",
            KnownNetwork::AvalancheFuji => "avalanche-fuji",
            KnownNetwork::PalmMainnet => "palm-mainnet",
            KnownNetwork::PalmTestnet => "palm-testnet",
            KnownNetwork::AuroraMainnet => "aurora-mainnet",
            KnownNetwork::AuroraTestnet => "aurora-testnet",
        }
    }

    /// Alternative spellings accepted on lookup, in addition to the name and chain ID.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            KnownNetwork::Mainnet => &["homestead", "ethereum"],
            KnownNetwork::Goerli => &[],
            KnownNetwork::Sepolia => &[],
            KnownNetwork::CeloMainnet => &["celo_mainnet"],
            KnownNetwork::CeloAlfajores => &["celo_alfajores"],
            KnownNetwork::AvalancheMainnet => &["avalanche_mainnet"],
            KnownNetwork::AvalancheFuji => &["avalanche_fuji"],
            KnownNetwork::PalmMainnet => &["palm_mainnet"],
            KnownNetwork::PalmTestnet => &["palm_testnet"],
            KnownNetwork::AuroraMainnet => &["aurora_mainnet"],
            KnownNetwork::AuroraTestnet => &["aurora_testnet"],
        }
    }

    /// Derive the gateway endpoint for this network from a `{network}` template.
    pub fn endpoint(&self, template: &str) -> String {
        template.replace("{network}", self.name())
    }

    /// Look up a network by chain ID, canonical name or alias.
    ///
    /// Matching is exact and case-insensitive. Decimal strings are matched against chain IDs.
    pub fn lookup(key: &str) -> Option<KnownNetwork> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if let Ok(chain_id) = key.parse::<u64>() {
            return Self::from_chain_id(chain_id);
        }

        Self::ALL.into_iter().find(|network| {
            network.name().eq_ignore_ascii_case(key) ||
                network.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(key))
        })
    }

    /// Look up a network by its numeric chain ID.
    pub fn from_chain_id(chain_id: u64) -> Option<KnownNetwork> {
        Self::ALL.into_iter().find(|network| network.chain_id() == chain_id)
    }

    /// Chain IDs of every known network, in listing order.
    pub fn chain_ids() -> Vec<u64> {
        Self::ALL.iter().map(KnownNetwork::chain_id).collect()
    }
}

impl fmt::Display for KnownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
