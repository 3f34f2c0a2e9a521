use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use mempool_ticker::FeeTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::explorer::{EndpointResolver, FetchError};
use crate::service::{AggregatorSettings, Capabilities};

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "TICKER_CONFIG_FILE";

const DEFAULT_ENDPOINTS: &str = "https://mempool.space/api/,https://mempool.emzy.de/api/";

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub explorer: ExplorerConfig,
    pub estimator: EstimatorConfig,
    pub refresh: RefreshConfig,
    pub capabilities: CapabilitiesConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 8080)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Mempool explorer configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExplorerConfig {
    /// Comma-separated base URLs, primary first
    pub endpoints: String,
    /// Per-attempt timeout in seconds (default: 10)
    pub timeout_secs: u64,
    /// Trailing blocks for the mean block time (default: 10)
    pub recent_blocks: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.to_string(),
            timeout_secs: 10,
            recent_blocks: 10,
        }
    }
}

/// Fee estimator configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Fee table slots (default: 7)
    pub fee_blocks: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            fee_blocks: FeeTable::DEFAULT_SLOTS,
        }
    }
}

/// Snapshot refresh configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RefreshConfig {
    /// Refreshes within this many seconds of the last success are skipped (default: 60)
    pub min_interval_secs: u64,
    /// Background refresh cadence in seconds (default: 120)
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 60,
            interval_secs: 120,
        }
    }
}

/// Which pre-computed explorer estimates to consult
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CapabilitiesConfig {
    pub upstream_fees: bool,
    pub upstream_difficulty: bool,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            upstream_fees: true,
            upstream_difficulty: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        // Load from config file if specified via environment variable
        if let Ok(config_file) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        } else {
            // Try to load default config files
            builder = builder
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config").required(false));
        }

        Self::finish(builder)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port)?
            .set_default("explorer.endpoints", defaults.explorer.endpoints)?
            .set_default("explorer.timeout_secs", defaults.explorer.timeout_secs)?
            .set_default("explorer.recent_blocks", defaults.explorer.recent_blocks as u64)?
            .set_default("estimator.fee_blocks", defaults.estimator.fee_blocks as u64)?
            .set_default("refresh.min_interval_secs", defaults.refresh.min_interval_secs)?
            .set_default("refresh.interval_secs", defaults.refresh.interval_secs)?
            .set_default("capabilities.upstream_fees", defaults.capabilities.upstream_fees)?
            .set_default(
                "capabilities.upstream_difficulty",
                defaults.capabilities.upstream_difficulty,
            )
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        // TICKER_SERVER__PORT, TICKER_EXPLORER__TIMEOUT_SECS, ...
        let config: Self = builder
            .add_source(
                Environment::with_prefix("TICKER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Rejects values no runtime object can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint_list().is_empty() {
            return Err(ConfigError::Message(
                "explorer.endpoints must name at least one URL".to_string(),
            ));
        }
        if self.explorer.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "explorer.timeout_secs must be positive".to_string(),
            ));
        }
        if self.explorer.recent_blocks < 2 {
            return Err(ConfigError::Message(
                "explorer.recent_blocks must be at least 2".to_string(),
            ));
        }
        if self.estimator.fee_blocks == 0 {
            return Err(ConfigError::Message(
                "estimator.fee_blocks must be at least 1".to_string(),
            ));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh.interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Explorer base URLs, primary first.
    pub fn endpoint_list(&self) -> Vec<&str> {
        self.explorer
            .endpoints
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.explorer.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Build the endpoint resolver for the explorer client
    pub fn to_resolver(&self) -> Result<EndpointResolver, FetchError> {
        EndpointResolver::new(&self.endpoint_list(), self.timeout())
    }

    /// Convert to aggregator settings
    pub fn to_aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            fee_slots: self.estimator.fee_blocks,
            recent_blocks: self.explorer.recent_blocks,
            min_refresh_interval: Duration::from_secs(self.refresh.min_interval_secs),
            capabilities: Capabilities {
                upstream_fees: self.capabilities.upstream_fees,
                upstream_difficulty: self.capabilities.upstream_difficulty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn yaml_file() -> NamedTempFile {
        Builder::new().suffix(".yaml").tempfile().unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.endpoint_list(),
            vec!["https://mempool.space/api/", "https://mempool.emzy.de/api/"]
        );
        assert_eq!(config.explorer.timeout_secs, 10);
        assert_eq!(config.estimator.fee_blocks, 7);
        assert_eq!(config.refresh.min_interval_secs, 60);
        assert!(config.capabilities.upstream_fees);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_matches_defaults() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("TICKER_SERVER__PORT", "9090");
        env::set_var("TICKER_EXPLORER__TIMEOUT_SECS", "3");
        env::set_var("TICKER_CAPABILITIES__UPSTREAM_FEES", "false");

        let config = AppConfig::load();

        env::remove_var("TICKER_SERVER__PORT");
        env::remove_var("TICKER_EXPLORER__TIMEOUT_SECS");
        env::remove_var("TICKER_CAPABILITIES__UPSTREAM_FEES");

        let config = config.unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(!config.capabilities.upstream_fees);
        assert!(config.capabilities.upstream_difficulty);
    }

    #[test]
    #[serial]
    fn test_from_yaml_file() {
        let mut file = yaml_file();
        writeln!(
            file,
            "explorer:\n  endpoints: \"http://localhost:3000/api, http://backup:3000/api\"\n  recent_blocks: 20\nestimator:\n  fee_blocks: 3\n"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.endpoint_list(),
            vec!["http://localhost:3000/api", "http://backup:3000/api"]
        );
        assert_eq!(config.explorer.recent_blocks, 20);
        assert_eq!(config.estimator.fee_blocks, 3);
        // Untouched sections keep their defaults
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.refresh.interval_secs, 120);
    }

    #[test]
    #[serial]
    fn test_config_file_env() {
        let mut file = yaml_file();
        writeln!(file, "refresh:\n  min_interval_secs: 5\n").unwrap();

        env::set_var(CONFIG_FILE_ENV, file.path());
        let config = AppConfig::load();
        env::remove_var(CONFIG_FILE_ENV);

        assert_eq!(config.unwrap().refresh.min_interval_secs, 5);
    }

    #[test]
    fn test_validation_rejects_unusable_values() {
        let mut config = AppConfig::default();
        config.explorer.endpoints = " , ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.estimator.fee_blocks = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.explorer.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_runtime_conversions() {
        let mut config = AppConfig::default();
        config.capabilities.upstream_difficulty = false;
        config.refresh.min_interval_secs = 30;

        let settings = config.to_aggregator_settings();
        assert_eq!(settings.fee_slots, 7);
        assert_eq!(settings.min_refresh_interval, Duration::from_secs(30));
        assert_eq!(
            settings.capabilities,
            Capabilities {
                upstream_fees: true,
                upstream_difficulty: false,
            }
        );

        let resolver = config.to_resolver().unwrap();
        assert_eq!(resolver.endpoints().len(), 2);
        assert_eq!(resolver.timeout(), Duration::from_secs(10));
    }
}
