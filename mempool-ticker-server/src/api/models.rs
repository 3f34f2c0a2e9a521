use chrono::{DateTime, Utc};
use mempool_ticker::{EstimateSource, Snapshot};
use serde::{Deserialize, Serialize};

/// GET /snapshot body: the snapshot plus display-ready derived values
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse<'a> {
    #[serde(flatten)]
    pub snapshot: &'a Snapshot,
    pub last_block_age_secs: i64,
    pub retarget_percent: f64,
    /// "mm:ss"
    pub mean_block_time: String,
}

impl<'a> From<&'a Snapshot> for SnapshotResponse<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            last_block_age_secs: snapshot.last_block_age_secs(),
            retarget_percent: round_to(snapshot.retarget_percent(), 2),
            mean_block_time: mean_block_time(snapshot),
        }
    }
}

/// One confirmation-target row of the fee table
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeSlotResponse {
    /// Blocks until confirmation, 1-based
    pub target: usize,
    pub min_fee: f64,
    pub median_fee: f64,
    pub max_fee: f64,
}

/// GET /fees body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesResponse {
    pub height: u64,
    pub fastest_fee: f64,
    pub half_hour_fee: f64,
    pub hour_fee: f64,
    pub source: EstimateSource,
    pub purging_fee: Option<f64>,
    pub blocks_to_clear: u64,
    pub table: Vec<FeeSlotResponse>,
    /// Dash-separated minimum fees, one per slot
    pub table_line: String,
    pub taken_at: DateTime<Utc>,
}

impl From<&Snapshot> for FeesResponse {
    fn from(snapshot: &Snapshot) -> Self {
        let table = (0..snapshot.fee_table.len())
            .filter_map(|i| {
                snapshot
                    .fee_table
                    .slot(i)
                    .map(|(min_fee, median_fee, max_fee)| FeeSlotResponse {
                        target: i + 1,
                        min_fee,
                        median_fee,
                        max_fee,
                    })
            })
            .collect();

        Self {
            height: snapshot.height,
            fastest_fee: snapshot.fee_recommendation.fastest_fee,
            half_hour_fee: snapshot.fee_recommendation.half_hour_fee,
            hour_fee: snapshot.fee_recommendation.hour_fee,
            source: snapshot.fee_source,
            purging_fee: snapshot.purging_fee,
            blocks_to_clear: snapshot.blocks_to_clear,
            table,
            table_line: snapshot.fee_table.to_string(),
            taken_at: snapshot.taken_at,
        }
    }
}

/// GET /difficulty body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyResponse {
    pub height: u64,
    pub last_retarget_height: u64,
    pub remaining_blocks: i64,
    pub retarget_date: DateTime<Utc>,
    pub retarget_multiplier: f64,
    pub retarget_percent: f64,
    pub minutes_between_blocks: f64,
    pub mean_block_time: String,
    pub source: EstimateSource,
}

impl From<&Snapshot> for DifficultyResponse {
    fn from(snapshot: &Snapshot) -> Self {
        let difficulty = &snapshot.difficulty;
        Self {
            height: snapshot.height,
            last_retarget_height: difficulty.last_retarget_height,
            remaining_blocks: difficulty.remaining_blocks,
            retarget_date: difficulty.retarget_date,
            retarget_multiplier: difficulty.retarget_multiplier,
            retarget_percent: round_to(difficulty.retarget_percent(), 2),
            minutes_between_blocks: difficulty.minutes_between_blocks,
            mean_block_time: mean_block_time(snapshot),
            source: snapshot.difficulty_source,
        }
    }
}

/// POST /refresh body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// False when the cached snapshot was still fresh
    pub refreshed: bool,
    pub height: u64,
    pub taken_at: DateTime<Utc>,
}

fn mean_block_time(snapshot: &Snapshot) -> String {
    let (minutes, seconds) = snapshot.difficulty.mean_block_time();
    format!("{minutes:02}:{seconds:02}")
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
