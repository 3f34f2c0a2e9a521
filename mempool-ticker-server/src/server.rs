use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::api::{get_difficulty, get_fees, get_snapshot, post_refresh, AppState};

/// Create the Axum application router
pub fn create_app(aggregator: AppState) -> Router {
    Router::new()
        // Snapshot endpoints
        .route("/snapshot", get(get_snapshot))
        .route("/fees", get(get_fees))
        .route("/difficulty", get(get_difficulty))
        .route("/refresh", post(post_refresh))
        // Health check endpoint
        .route("/health", get(health_check))
        // Add shared state
        .with_state(aggregator)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Run the HTTP server
pub async fn run_server(app: Router, host: String, port: u16) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP server listening on http://{}", addr);
    info!("API endpoints:");
    info!("  GET  /snapshot - Full mempool and difficulty snapshot");
    info!("  GET  /fees - Fee recommendation and fee table");
    info!("  GET  /difficulty - Next difficulty retarget projection");
    info!("  POST /refresh - Refresh the snapshot if stale");
    info!("  GET  /health - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    info!("Received shutdown signal, shutting down gracefully...");
}
