use axum::http::{Method, Request, StatusCode};
use mempool_ticker_server::config::AppConfig;
use mempool_ticker_server::explorer::{ExplorerBackend, ExplorerClient};
use mempool_ticker_server::server::create_app;
use mempool_ticker_server::service::Aggregator;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIP: u64 = 850_000;
const NEWEST_TS: i64 = 1_718_000_000;
const RETARGET: u64 = 848_736;

fn block(height: u64, secs_per_block: i64) -> Value {
    json!({
        "id": format!("{height:064x}"),
        "height": height,
        "timestamp": NEWEST_TS - (TIP - height) as i64 * secs_per_block,
    })
}

/// Explorer serving a chain mined every 12 minutes with a busy mempool
async fn start_explorer() -> MockServer {
    let server = MockServer::start().await;
    let retarget_route = format!("/api/block/{RETARGET:064x}");
    let routes = [
        ("/api/blocks/tip/height", json!(TIP.to_string())),
        (
            "/api/v1/fees/mempool-blocks",
            json!([
                {"feeRange": [25.0, 30.0, 300.0], "blockVSize": 997_000.0, "nTx": 2800, "medianFee": 30.0},
                {"feeRange": [12.0, 20.0, 25.0], "blockVSize": 997_000.0, "nTx": 3100, "medianFee": 20.0},
                {"feeRange": [6.0, 10.0, 12.0], "blockVSize": 997_000.0, "nTx": 3300, "medianFee": 10.0},
                {"feeRange": [1.0, 2.0, 6.0], "blockVSize": 700_000.0, "nTx": 1900, "medianFee": 2.0},
            ]),
        ),
        (
            "/api/mempool",
            json!({"count": 11_000, "vsize": 3_691_000, "total_fee": 35_000_000.0, "fee_histogram": []}),
        ),
        (
            "/api/blocks",
            json!((0..10).map(|i| block(TIP - i, 720)).collect::<Vec<_>>()),
        ),
        (retarget_route.as_str(), block(RETARGET, 720)),
    ];
    for (route, body) in routes {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/api/block-height/{RETARGET}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{RETARGET:064x}")))
        .mount(&server)
        .await;
    server
}

async fn start_dead_mirror() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

/// App over `endpoints`, local estimates only
fn create_test_app(endpoints: &[&MockServer]) -> anyhow::Result<axum::Router> {
    let mut config = AppConfig::default();
    config.explorer.endpoints = endpoints
        .iter()
        .map(|server| format!("{}/api/", server.uri()))
        .collect::<Vec<_>>()
        .join(",");
    config.capabilities.upstream_fees = false;
    config.capabilities.upstream_difficulty = false;
    config.refresh.min_interval_secs = 0;
    config.validate()?;

    let explorer = ExplorerBackend::Real(ExplorerClient::new(config.to_resolver()?));
    let aggregator = Arc::new(Aggregator::new(explorer, config.to_aggregator_settings()));
    Ok(create_app(aggregator))
}

async fn send(app: &axum::Router, method: Method, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(axum::body::Body::empty())?)
        .await?;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Ok((status, json))
}

#[tokio::test]
async fn test_health_endpoint() -> anyhow::Result<()> {
    let explorer = start_explorer().await;
    let app = create_test_app(&[&explorer])?;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(axum::body::Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_refresh_through_dead_primary() -> anyhow::Result<()> {
    let dead = start_dead_mirror().await;
    let explorer = start_explorer().await;
    let app = create_test_app(&[&dead, &explorer])?;

    let (status, _) = send(&app, Method::GET, "/fees").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, refresh) = send(&app, Method::POST, "/refresh").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refresh["refreshed"], true);
    assert_eq!(refresh["height"], TIP);

    let (status, fees) = send(&app, Method::GET, "/fees").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fees["source"], "local");
    assert_eq!(fees["fastestFee"], 30.0);
    assert_eq!(fees["halfHourFee"], 25.0);
    assert_eq!(fees["hourFee"], 17.5);
    assert_eq!(fees["blocksToClear"], 4);
    assert_eq!(fees["tableLine"], "25.0-12.0-6.0-1.0-1.0-1.0-1.0");

    Ok(())
}

#[tokio::test]
async fn test_local_difficulty_projection() -> anyhow::Result<()> {
    let explorer = start_explorer().await;
    let app = create_test_app(&[&explorer])?;

    send(&app, Method::POST, "/refresh").await?;
    let (status, difficulty) = send(&app, Method::GET, "/difficulty").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(difficulty["source"], "local");
    assert_eq!(difficulty["lastRetargetHeight"], RETARGET);
    assert_eq!(difficulty["remainingBlocks"], 752);
    assert_eq!(difficulty["meanBlockTime"], "12:00");
    // Twelve-minute blocks: the next epoch gets easier
    assert_eq!(difficulty["retargetPercent"], -16.67);

    Ok(())
}

#[tokio::test]
async fn test_stale_snapshot_survives_outage() -> anyhow::Result<()> {
    let explorer = start_explorer().await;
    let app = create_test_app(&[&explorer])?;

    send(&app, Method::POST, "/refresh").await?;
    let (_, before) = send(&app, Method::GET, "/snapshot").await?;

    explorer.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&explorer)
        .await;

    let (status, _) = send(&app, Method::POST, "/refresh").await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, after) = send(&app, Method::GET, "/snapshot").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["takenAt"], before["takenAt"]);
    assert_eq!(after["height"], TIP);

    Ok(())
}
