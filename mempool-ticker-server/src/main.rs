//! Mempool Ticker Server - HTTP API for mempool and difficulty snapshots

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mempool_ticker_server::{
    api::SnapshotResponse,
    cli::Cli,
    config::AppConfig,
    explorer::{ExplorerApi, ExplorerBackend, ExplorerClient, MockExplorerClient},
    server::{create_app, run_server},
    service::Aggregator,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing to stderr
    let filter = EnvFilter::try_new(&cli.log_filter).context("Invalid log filter")?;
    let (json_layer, compact_layer) = if cli.log_json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json(),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            ),
        )
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(compact_layer)
        .init();

    info!("Mempool Ticker Server starting...");

    // Load configuration, CLI flags win
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if cli.print_config {
        print!(
            "{}",
            serde_yaml::to_string(&config).context("Failed to render configuration")?
        );
        return Ok(());
    }

    info!("Configuration loaded:");
    info!("  Server: {}:{}", config.server.host, config.server.port);
    info!("  Explorer endpoints: {}", config.endpoint_list().join(", "));
    info!("  Timeout per attempt: {}s", config.explorer.timeout_secs);
    info!("  Fee table slots: {}", config.estimator.fee_blocks);
    info!(
        "  Refresh: every {}s, at most once per {}s",
        config.refresh.interval_secs, config.refresh.min_interval_secs
    );
    info!(
        "  Upstream estimates: fees={}, difficulty={}",
        config.capabilities.upstream_fees, config.capabilities.upstream_difficulty
    );

    // Initialize explorer client
    let explorer = if cli.test_mode {
        warn!("Test mode: serving data from the built-in mock explorer");
        ExplorerBackend::Mock(MockExplorerClient::new())
    } else {
        let resolver = config
            .to_resolver()
            .context("Failed to initialize explorer client")?;
        ExplorerBackend::Real(ExplorerClient::new(resolver))
    };

    // Test explorer connection
    match explorer.test_connection().await {
        Ok(_) => info!("Successfully connected to the mempool explorer"),
        Err(e) => {
            error!("Failed to connect to the mempool explorer: {}", e);
            // Continue anyway - the refresher will retry
        }
    }

    let aggregator = Arc::new(Aggregator::new(explorer, config.to_aggregator_settings()));

    if cli.once {
        let outcome = aggregator
            .refresh()
            .await
            .context("Failed to build snapshot")?;
        let json = serde_json::to_string_pretty(&SnapshotResponse::from(outcome.snapshot().as_ref()))
            .context("Failed to serialize snapshot")?;
        println!("{json}");
        return Ok(());
    }

    // Spawn background refresh task
    let refresher = aggregator.clone();
    let interval = config.refresh_interval();
    tokio::spawn(async move {
        refresher.run(interval).await;
    });

    // Create and run HTTP server
    let app = create_app(aggregator);

    run_server(app, config.server.host, config.server.port)
        .await
        .context("Failed to run HTTP server")?;

    info!("Mempool Ticker Server shut down");

    Ok(())
}
