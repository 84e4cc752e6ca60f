use crate::eth::{networks::DEFAULT_GATEWAY_TEMPLATE, wallet::DEFAULT_DERIVATION_PATH};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};

/// A configured node for one network key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Node URL
    pub node: String,

    /// Private key used only for this network, overriding the provider-wide signer
    #[serde(default)]
    pub private_key: Option<String>,
}

/// Configuration for connection resolution and signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Named connections, keyed by network name or chain ID
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,

    /// Default network to use; must be one of `networks` when set
    #[serde(default)]
    pub default_network: Option<String>,

    /// Provider-wide private key
    #[serde(default)]
    pub private_key: Option<String>,

    /// Mnemonic phrase, alternative to `private_key`
    #[serde(default)]
    pub mnemonic: Option<String>,

    /// Account derivation path used with `mnemonic`
    #[serde(default = "default_derivation_path")]
    pub derivation_path: String,

    /// Endpoint template for known networks without a configured node
    #[serde(default = "default_gateway_template")]
    pub gateway_template: String,
}

/// Default derivation path for Ethereum wallets
fn default_derivation_path() -> String {
    DEFAULT_DERIVATION_PATH.to_string()
}

fn default_gateway_template() -> String {
    DEFAULT_GATEWAY_TEMPLATE.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            networks: BTreeMap::new(),
            default_network: None,
            private_key: None,
            mnemonic: None,
            derivation_path: default_derivation_path(),
            gateway_template: default_gateway_template(),
        }
    }
}

/// Polling cadence and timeout for confirmation waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_receipt_poll_interval")]
    pub receipt_poll_interval_ms: u64,
    #[serde(default = "default_confirmation_poll_interval")]
    pub confirmation_poll_interval_ms: u64,
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,
}

fn default_receipt_poll_interval() -> u64 {
    100
}

fn default_confirmation_poll_interval() -> u64 {
    500
}

fn default_timeout() -> u64 {
    300
}

impl WaitConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            receipt_poll_interval_ms: default_receipt_poll_interval(),
            confirmation_poll_interval_ms: default_confirmation_poll_interval(),
            default_timeout_secs: default_timeout(),
        }
    }
}
