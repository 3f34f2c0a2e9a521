//! Command-line interface configuration

use clap::Parser;

use crate::config::AppConfig;

/// Mempool Ticker Server CLI
///
/// Every option left unset keeps the value from the config file and
/// `TICKER_*` environment variables.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // Server options
    /// Host to bind the server to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    // Explorer options
    /// Comma-separated explorer base URLs, primary first
    #[arg(short, long)]
    pub endpoints: Option<String>,

    /// Per-attempt explorer timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    // Estimation settings
    /// Number of fee table slots
    #[arg(long)]
    pub fee_blocks: Option<usize>,

    /// Refreshes within this many seconds of the last success are skipped
    #[arg(long)]
    pub min_refresh_secs: Option<u64>,

    /// Background refresh cadence in seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Always compute fee recommendations locally
    #[arg(long)]
    pub no_upstream_fees: bool,

    /// Always compute the difficulty projection locally
    #[arg(long)]
    pub no_upstream_difficulty: bool,

    // Test mode
    /// Serve data from a built-in mock explorer
    #[arg(long)]
    pub test_mode: bool,

    // Logging
    /// Log filter (e.g., "mempool_ticker_server=debug,mempool_ticker=info")
    #[arg(
        long,
        env = "RUST_LOG",
        default_value = "mempool_ticker_server=info,mempool_ticker=info"
    )]
    pub log_filter: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Path to configuration file (overridden by CLI args)
    #[arg(short, long, env = "TICKER_CONFIG_FILE")]
    pub config: Option<String>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Refresh once, print the snapshot as JSON and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Applies every option given on the command line over `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(endpoints) = &self.endpoints {
            config.explorer.endpoints = endpoints.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.explorer.timeout_secs = timeout;
        }
        if let Some(fee_blocks) = self.fee_blocks {
            config.estimator.fee_blocks = fee_blocks;
        }
        if let Some(secs) = self.min_refresh_secs {
            config.refresh.min_interval_secs = secs;
        }
        if let Some(secs) = self.interval_secs {
            config.refresh.interval_secs = secs;
        }
        if self.no_upstream_fees {
            config.capabilities.upstream_fees = false;
        }
        if self.no_upstream_difficulty {
            config.capabilities.upstream_difficulty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_only_given_options() {
        let cli = Cli::try_parse_from([
            "mempool-ticker-server",
            "--port",
            "9000",
            "--endpoints",
            "http://localhost:3000/api/",
            "--no-upstream-fees",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.endpoint_list(), vec!["http://localhost:3000/api/"]);
        assert!(!config.capabilities.upstream_fees);
        assert!(config.capabilities.upstream_difficulty);
        assert_eq!(config.estimator.fee_blocks, 7);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "mempool-ticker-server",
            "--test-mode",
            "--once",
            "--fee-blocks",
            "3",
        ])
        .unwrap();

        assert!(cli.test_mode);
        assert!(cli.once);
        assert!(!cli.print_config);
        assert_eq!(cli.fee_blocks, Some(3));
    }

    #[test]
    fn test_cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["mempool-ticker-server", "--port", "http"]).is_err());
    }
}
