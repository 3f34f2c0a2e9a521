//! HTTP API endpoints for snapshot readers

mod error;
mod models;
mod snapshot_endpoint;

pub use error::ApiError;
pub use models::{
    DifficultyResponse, FeeSlotResponse, FeesResponse, RefreshResponse, SnapshotResponse,
};
pub use snapshot_endpoint::{get_difficulty, get_fees, get_snapshot, post_refresh, AppState};
