use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mempool_ticker::TickerError;
use thiserror::Error;

use crate::service::RefreshError;

/// API-specific error types with proper HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// No snapshot yet or not enough chain data (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Every explorer endpoint failed (502)
    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// Internal server error - unexpected failure (500)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn no_snapshot() -> Self {
        ApiError::ServiceUnavailable("No snapshot available yet".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Fetch(err) => ApiError::BadGateway(format!("Explorer error: {err}")),
            // An empty mempool or a short chain clears up on its own
            RefreshError::Estimation(
                err @ (TickerError::EmptyProjectedBlocks | TickerError::InsufficientBlocks(_)),
            ) => ApiError::ServiceUnavailable(err.to_string()),
            RefreshError::Estimation(err) => {
                ApiError::InternalError(format!("Estimation error: {err}"))
            }
        }
    }
}
