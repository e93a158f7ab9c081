//! Configuration for relayd

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use relay_service::{PolicyConfig, RelayConfig, DEFAULT_LEDGER_CAPACITY};
use relay_types::Address;
use relay_vault::DEFAULT_CALL_LOG_CAPACITY;
use serde::{Deserialize, Serialize};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Execution relay settings
    #[serde(default)]
    pub relay: RelaySettings,

    /// Vault backend
    #[serde(default)]
    pub vault: VaultConfig,

    /// Startup policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8545)),
            enable_cors: true,
        }
    }
}

/// Execution relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// The relay's module address as enabled on the vault
    #[serde(default)]
    pub module: Address,

    /// Bound on the forward-to-vault step in milliseconds
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_ms: u64,

    /// Most ledger entries kept in memory
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            module: Address::ZERO,
            forward_timeout_ms: default_forward_timeout(),
            ledger_capacity: default_ledger_capacity(),
        }
    }
}

impl RelaySettings {
    pub fn to_relay_config(&self) -> RelayConfig {
        RelayConfig {
            module: self.module,
            forward_timeout: Duration::from_millis(self.forward_timeout_ms),
            ledger_capacity: self.ledger_capacity,
        }
    }
}

/// Vault backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VaultConfig {
    /// In-process vault with the relay's module enabled
    Memory {
        /// Most executed calls kept in the vault's log
        #[serde(default = "default_call_log_capacity")]
        call_log_capacity: usize,
    },

    /// Vault reached over HTTP
    Http {
        /// Base URL; calls go to `{url}/execute`
        url: String,

        /// Request timeout in milliseconds
        #[serde(default = "default_vault_timeout")]
        timeout_ms: u64,
    },
}

impl Default for VaultConfig {
    fn default() -> Self {
        VaultConfig::Memory {
            call_log_capacity: default_call_log_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_forward_timeout() -> u64 {
    30_000
}

fn default_ledger_capacity() -> usize {
    DEFAULT_LEDGER_CAPACITY
}

fn default_call_log_capacity() -> usize {
    DEFAULT_CALL_LOG_CAPACITY
}

fn default_vault_timeout() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `RELAY_`-prefixed environment variables (`RELAY_SERVER__LISTEN_ADDR`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with RELAY_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("RELAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&DaemonConfig::default())?)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8545);
        match config.vault {
            VaultConfig::Memory { call_log_capacity } => {
                assert_eq!(call_log_capacity, DEFAULT_CALL_LOG_CAPACITY)
            }
            other => panic!("expected memory vault, got {:?}", other),
        }
        assert_eq!(config.relay.forward_timeout_ms, 30_000);
        assert_eq!(
            config.relay.to_relay_config().ledger_capacity,
            DEFAULT_LEDGER_CAPACITY
        );
        assert!(config.policy.governance.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_policy_and_http_vault() {
        let config = DaemonConfig::from_toml(
            r#"
            [relay]
            module = "0x0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d"
            forward_timeout_ms = 1500

            [vault]
            type = "http"
            url = "http://vault.internal:9000"

            [policy]
            governance = "0x6060606060606060606060606060606060606060"
            executors = ["0xe1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1"]

            [[policy.targets]]
            target = "0x1010101010101010101010101010101010101010"
            scoped = true
            selectors = ["transfer(address,uint256)", "0x095ea7b3"]
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.module, Address::repeat_byte(0x0d));
        assert_eq!(
            config.relay.to_relay_config().forward_timeout,
            Duration::from_millis(1500)
        );
        match config.vault {
            VaultConfig::Http { url, timeout_ms } => {
                assert_eq!(url, "http://vault.internal:9000");
                assert_eq!(timeout_ms, 10_000);
            }
            other => panic!("expected http vault, got {:?}", other),
        }
        assert!(config.policy.governance.is_some());
        assert_eq!(config.policy.executors.len(), 1);
        assert_eq!(config.policy.targets[0].selectors.len(), 2);
        assert!(config.policy.targets[0].allowed);
    }

    #[test]
    fn test_toml_log_capacities() {
        let config = DaemonConfig::from_toml(
            r#"
            [relay]
            ledger_capacity = 250

            [vault]
            type = "memory"
            call_log_capacity = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.to_relay_config().ledger_capacity, 250);
        match config.vault {
            VaultConfig::Memory { call_log_capacity } => assert_eq!(call_log_capacity, 16),
            other => panic!("expected memory vault, got {:?}", other),
        }
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("RELAY_LOGGING__LEVEL", "relay_gate=debug");
        let config = DaemonConfig::load(None).unwrap();
        std::env::remove_var("RELAY_LOGGING__LEVEL");
        assert_eq!(config.logging.level, "relay_gate=debug");
    }
}
