//! Configuration management for the application
use crate::{
    eth::{
        Connection, Connections, EthError, LocalWallet, ProviderConfig, SecureMnemonic,
        WaitConfig, Wallet, normalize_network_key, same_network,
    },
    plugin::EthereumProviderPlugin,
};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, sync::Arc};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Provider setup failed: {0}")]
    Provider(#[from] EthError),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging format: "json" or "text"
    pub format: String,
    /// Default log level if no RUST_LOG is set
    pub default_level: String,
    /// Custom filter for dependency logs
    pub dependency_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            default_level: "info".to_string(),
            dependency_filter: Some(
                "hyper=warn,hyper_util=warn,reqwest=warn,alloy_transport_http=info,alloy_rpc_client=info"
                    .to_string(),
            ),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv().ok();

        Self::figment().extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Layered sources: defaults, then `ETH_PROVIDER_CONFIG` TOML file, then `ETH_PROVIDER_*` env
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // The config file location can only come from the environment
        if let Some(config_path) = std::env::var_os("ETH_PROVIDER_CONFIG") {
            let path = Path::new(&config_path);
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.merge(Env::prefixed("ETH_PROVIDER_").ignore(&["CONFIG"]).split("__"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = &self.provider;

        if provider.private_key.is_some() && provider.mnemonic.is_some() {
            return Err(ConfigError::InvalidValue(
                "Set either provider.private_key or provider.mnemonic, not both".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (network, config) in &provider.networks {
            if !seen.insert(normalize_network_key(network)) {
                return Err(ConfigError::InvalidValue(format!(
                    "Network {} is configured more than once",
                    network
                )));
            }
            if config.node.trim().is_empty() {
                return Err(ConfigError::MissingConfig(format!(
                    "Node URL is required for network {}",
                    network
                )));
            }
        }

        if let Some(default_network) = &provider.default_network {
            if !provider.networks.keys().any(|network| same_network(network, default_network)) {
                return Err(ConfigError::InvalidValue(format!(
                    "Default network {} has no configured node",
                    default_network
                )));
            }
        }

        if !provider.gateway_template.contains("{network}") {
            return Err(ConfigError::InvalidValue(
                "provider.gateway_template must contain {network}".to_string(),
            ));
        }

        if self.wait.receipt_poll_interval_ms == 0 || self.wait.confirmation_poll_interval_ms == 0
        {
            return Err(ConfigError::InvalidValue("Poll intervals must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Build the provider-wide signer, if one is configured.
    pub fn signer(&self) -> Result<Option<Arc<dyn Wallet>>, ConfigError> {
        let provider = &self.provider;

        let wallet = match (&provider.private_key, &provider.mnemonic) {
            (Some(key), _) => LocalWallet::from_private_key(key)?,
            (None, Some(phrase)) => {
                let mnemonic = SecureMnemonic::new(phrase.clone());
                LocalWallet::from_mnemonic(&mnemonic, &provider.derivation_path)?
            },
            (None, None) => return Ok(None),
        };

        Ok(Some(Arc::new(wallet)))
    }

    /// Build the connection resolver described by this configuration.
    pub fn connections(&self) -> Result<Connections, ConfigError> {
        self.validate()?;

        let provider = &self.provider;
        let mut builder =
            Connections::builder().with_gateway_template(provider.gateway_template.clone());

        for (network, config) in &provider.networks {
            let signer = match &config.private_key {
                Some(key) => Some(Arc::new(LocalWallet::from_private_key(key)?) as Arc<dyn Wallet>),
                None => None,
            };
            builder = builder.with_network(network, Connection::from_node(&config.node, signer));
        }

        if let Some(default_network) = &provider.default_network {
            builder = builder.with_default_network(default_network);
        }

        if let Some(signer) = self.signer()? {
            builder = builder.with_signer(signer);
        }

        Ok(builder.build()?)
    }

    /// Build the plugin module described by this configuration.
    pub fn plugin(&self) -> Result<EthereumProviderPlugin, ConfigError> {
        Ok(EthereumProviderPlugin::new(self.connections()?).with_wait_config(self.wait.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth::NetworkConfig;
    use figment::Jail;

    const KEY: &str = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let connections = config.connections().unwrap();
        assert_eq!(connections.default_network(), "mainnet");
        assert!(!connections.has_signer());
    }

    #[test]
    fn test_rejects_both_key_and_mnemonic() {
        let mut config = Config::default();
        config.provider.private_key = Some(KEY.to_string());
        config.provider.mnemonic = Some("test test test".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_unconfigured_default_network() {
        let mut config = Config::default();
        config.provider.default_network = Some("goerli".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_default_network_matches_chain_id_key() {
        let mut config = Config::default();
        config.provider.networks.insert(
            "5".to_string(),
            NetworkConfig { node: "http://goerli.local".to_string(), private_key: None },
        );
        config.provider.default_network = Some("Goerli".to_string());

        let connections = config.connections().unwrap();
        assert_eq!(connections.default_network(), "5");
        assert_eq!(connections.resolve(None).unwrap().endpoint(), "http://goerli.local");
    }

    #[test]
    fn test_rejects_case_folded_duplicate_networks() {
        let mut config = Config::default();
        for key in ["Local", "local"] {
            config.provider.networks.insert(
                key.to_string(),
                NetworkConfig { node: "http://127.0.0.1:8545".to_string(), private_key: None },
            );
        }
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_invalid_private_key() {
        let mut config = Config::default();
        config.provider.private_key = Some("0x1234".to_string());
        assert!(matches!(
            config.connections(),
            Err(ConfigError::Provider(EthError::InvalidPrivateKey))
        ));
    }

    #[test]
    fn test_load_from_toml_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "provider.toml",
                r#"
                [provider]
                default_network = "local"

                [provider.networks.local]
                node = "http://127.0.0.1:8545"

                [wait]
                receipt_poll_interval_ms = 50
                "#,
            )?;
            jail.set_env("ETH_PROVIDER_CONFIG", "provider.toml");
            jail.set_env("ETH_PROVIDER_PROVIDER__PRIVATE_KEY", KEY);
            jail.set_env("ETH_PROVIDER_WAIT__DEFAULT_TIMEOUT_SECS", "30");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.wait.receipt_poll_interval_ms, 50);
            assert_eq!(config.wait.confirmation_poll_interval_ms, 500);
            assert_eq!(config.wait.default_timeout_secs, 30);
            assert_eq!(config.provider.private_key.as_deref(), Some(KEY));

            let connections = config.connections().expect("valid config");
            assert_eq!(connections.default_network(), "local");
            assert!(connections.resolve(None).expect("default").has_signer());
            Ok(())
        });
    }
}
