use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::models::{DifficultyResponse, FeesResponse, RefreshResponse, SnapshotResponse};
use crate::service::{Aggregator, RefreshOutcome};

/// Shared handler state
pub type AppState = Arc<Aggregator>;

/// GET /snapshot - Returns the full current snapshot
pub async fn get_snapshot(State(aggregator): State<AppState>) -> Response {
    debug!("Received request for snapshot");

    match aggregator.get_data().await {
        Some(snapshot) => Json(SnapshotResponse::from(snapshot.as_ref())).into_response(),
        None => {
            warn!("No snapshot available yet");
            ApiError::no_snapshot().into_response()
        }
    }
}

/// GET /fees - Returns fee recommendation and per-target fee table
pub async fn get_fees(State(aggregator): State<AppState>) -> Response {
    debug!("Received request for fees");

    match aggregator.get_data().await {
        Some(snapshot) => {
            let response = FeesResponse::from(snapshot.as_ref());
            debug!(
                "Returning fees with {} table slots ({:?})",
                response.table.len(),
                response.source
            );
            Json(response).into_response()
        }
        None => {
            warn!("No fee data available yet");
            ApiError::no_snapshot().into_response()
        }
    }
}

/// GET /difficulty - Returns the next retarget projection
pub async fn get_difficulty(State(aggregator): State<AppState>) -> Response {
    debug!("Received request for difficulty projection");

    match aggregator.get_data().await {
        Some(snapshot) => Json(DifficultyResponse::from(snapshot.as_ref())).into_response(),
        None => {
            warn!("No difficulty projection available yet");
            ApiError::no_snapshot().into_response()
        }
    }
}

/// POST /refresh - Refreshes the snapshot unless it is still fresh
pub async fn post_refresh(State(aggregator): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    info!("Received refresh request");

    let outcome = aggregator.refresh().await.map_err(|e| {
        warn!("Requested refresh failed: {}", e);
        ApiError::from(e)
    })?;

    let snapshot = outcome.snapshot();
    Ok(Json(RefreshResponse {
        refreshed: matches!(outcome, RefreshOutcome::Refreshed(_)),
        height: snapshot.height,
        taken_at: snapshot.taken_at,
    }))
}

#[cfg(test)]
#[path = "snapshot_endpoint_tests.rs"]
mod tests;
