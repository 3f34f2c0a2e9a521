//! Wire formats of the mempool explorer REST API and their mapping onto
//! library types.
//!
//! Every `parse_*` function is a pure mapping from a response body to a typed
//! value. An empty but well-formed answer (e.g. `[]`) is a value; anything that
//! does not have the expected shape is a [`ParseError`].

use chrono::DateTime;
use mempool_ticker::{
    BlockRef, DifficultyProjection, FeeRecommendation, MempoolSummary, ProjectedBlock,
    TickerError, RETARGET_INTERVAL,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Response body did not have the expected shape
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected shape: {0}")]
    Shape(String),

    #[error("invalid value: {0}")]
    Invalid(#[from] TickerError),
}

impl ParseError {
    fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}

/// `GET v1/fees/mempool-blocks` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolBlockTemplate {
    pub fee_range: Vec<f64>,
    pub block_v_size: f64,
    pub n_tx: u64,
    #[serde(default)]
    pub median_fee: Option<f64>,
    #[serde(default)]
    pub block_size: Option<u64>,
    #[serde(default)]
    pub total_fees: Option<u64>,
}

impl TryFrom<MempoolBlockTemplate> for ProjectedBlock {
    type Error = TickerError;

    fn try_from(template: MempoolBlockTemplate) -> Result<Self, Self::Error> {
        ProjectedBlock::with_median(
            template.fee_range,
            template.block_v_size,
            template.n_tx,
            template.median_fee,
        )
    }
}

/// `GET v1/fees/recommended`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFeesResponse {
    pub fastest_fee: f64,
    pub half_hour_fee: f64,
    pub hour_fee: f64,
    #[serde(default)]
    pub economy_fee: Option<f64>,
    #[serde(default)]
    pub minimum_fee: Option<f64>,
}

impl From<RecommendedFeesResponse> for FeeRecommendation {
    fn from(fees: RecommendedFeesResponse) -> Self {
        FeeRecommendation::new(fees.fastest_fee, fees.half_hour_fee, fees.hour_fee)
    }
}

/// `GET v1/difficulty-adjustment`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustmentResponse {
    #[serde(default)]
    pub progress_percent: Option<f64>,
    /// Projected change in percent
    pub difficulty_change: f64,
    /// Unix milliseconds
    pub estimated_retarget_date: i64,
    pub remaining_blocks: i64,
    #[serde(default)]
    pub remaining_time: Option<i64>,
    #[serde(default)]
    pub previous_retarget: Option<f64>,
    pub next_retarget_height: u64,
    /// Average block interval in milliseconds
    pub time_avg: f64,
}

impl TryFrom<DifficultyAdjustmentResponse> for DifficultyProjection {
    type Error = ParseError;

    fn try_from(adjustment: DifficultyAdjustmentResponse) -> Result<Self, Self::Error> {
        let retarget_date = DateTime::from_timestamp_millis(adjustment.estimated_retarget_date)
            .ok_or_else(|| {
                ParseError::shape(format!(
                    "estimatedRetargetDate {} out of range",
                    adjustment.estimated_retarget_date
                ))
            })?;
        if !adjustment.time_avg.is_finite() || adjustment.time_avg <= 0.0 {
            return Err(ParseError::shape(format!(
                "timeAvg {} is not a positive interval",
                adjustment.time_avg
            )));
        }

        Ok(DifficultyProjection {
            last_retarget_height: adjustment
                .next_retarget_height
                .saturating_sub(RETARGET_INTERVAL),
            remaining_blocks: adjustment.remaining_blocks,
            minutes_between_blocks: adjustment.time_avg / 60_000.0,
            retarget_date,
            retarget_multiplier: 1.0 + adjustment.difficulty_change / 100.0,
        })
    }
}

/// `GET block/{hash}` and `GET blocks[/{height}]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResponse {
    pub id: String,
    pub height: u64,
    pub timestamp: i64,
    #[serde(default)]
    pub tx_count: Option<u64>,
}

impl From<BlockResponse> for BlockRef {
    fn from(block: BlockResponse) -> Self {
        BlockRef::new(block.height, block.timestamp, block.id)
    }
}

/// `GET mempool`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolResponse {
    pub count: u64,
    pub vsize: u64,
    #[serde(default)]
    pub total_fee: f64,
    #[serde(default)]
    pub fee_histogram: Vec<(f64, f64)>,
}

impl From<MempoolResponse> for MempoolSummary {
    fn from(mempool: MempoolResponse) -> Self {
        let histogram = mempool
            .fee_histogram
            .into_iter()
            .map(|(fee_rate, vsize)| (fee_rate, vsize.max(0.0).round() as u64))
            .collect();
        MempoolSummary::new(
            mempool.count,
            mempool.vsize,
            mempool.total_fee.max(0.0).round() as u64,
            histogram,
        )
    }
}

/// Parses the tip height, sent either as a bare integer or a JSON string.
pub fn parse_tip_height(body: &str) -> Result<u64, ParseError> {
    let trimmed = body.trim();
    if let Ok(height) = trimmed.parse::<u64>() {
        return Ok(height);
    }

    match serde_json::from_str::<Value>(trimmed)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ParseError::shape(format!("height {n} is not a block height"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::shape(format!("height \"{s}\" is not an integer"))),
        other => Err(ParseError::shape(format!(
            "expected an integer height, got {other}"
        ))),
    }
}

/// Parses the projected mempool blocks. An empty array is a valid answer.
pub fn parse_mempool_blocks(body: &str) -> Result<Vec<ProjectedBlock>, ParseError> {
    let templates: Vec<MempoolBlockTemplate> = serde_json::from_str(body)?;
    templates
        .into_iter()
        .map(|template| ProjectedBlock::try_from(template).map_err(ParseError::from))
        .collect()
}

pub fn parse_recommended_fees(body: &str) -> Result<FeeRecommendation, ParseError> {
    let fees: RecommendedFeesResponse = serde_json::from_str(body)?;
    Ok(fees.into())
}

pub fn parse_difficulty_adjustment(body: &str) -> Result<DifficultyProjection, ParseError> {
    let adjustment: DifficultyAdjustmentResponse = serde_json::from_str(body)?;
    adjustment.try_into()
}

pub fn parse_block(body: &str) -> Result<BlockRef, ParseError> {
    let block: BlockResponse = serde_json::from_str(body)?;
    Ok(block.into())
}

/// Parses a block list, newest first as the explorer returns it.
pub fn parse_blocks(body: &str) -> Result<Vec<BlockRef>, ParseError> {
    let blocks: Vec<BlockResponse> = serde_json::from_str(body)?;
    Ok(blocks.into_iter().map(BlockRef::from).collect())
}

/// Parses a block hash, sent as plain hex text.
pub fn parse_block_hash(body: &str) -> Result<String, ParseError> {
    let hash = body.trim().trim_matches('"');
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::shape(format!("`{hash}` is not a block hash")));
    }
    Ok(hash.to_ascii_lowercase())
}

pub fn parse_mempool(body: &str) -> Result<MempoolSummary, ParseError> {
    let mempool: MempoolResponse = serde_json::from_str(body)?;
    Ok(mempool.into())
}
