use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TickerError};

/// Blocks per difficulty epoch.
pub const RETARGET_INTERVAL: u64 = 2016;

/// Target length of one difficulty epoch: two weeks, in seconds.
pub const TARGET_EPOCH_SECS: f64 = 14.0 * 24.0 * 3600.0;

/// Reference to one chain block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block height
    pub height: u64,
    /// Block timestamp, unix seconds
    pub timestamp: i64,
    /// Block hash as reported by the explorer
    pub hash: String,
}

impl BlockRef {
    /// Creates a block reference from its height, unix timestamp and hash.
    pub fn new(height: u64, timestamp: i64, hash: impl Into<String>) -> Self {
        Self {
            height,
            timestamp,
            hash: hash.into(),
        }
    }
}

/// Height of the first block of the epoch containing `height`.
pub fn retarget_height(height: u64) -> u64 {
    height - height % RETARGET_INTERVAL
}

/// Projection of the next difficulty adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyProjection {
    /// Height at which the current epoch started
    pub last_retarget_height: u64,
    /// Blocks left until the next adjustment
    pub remaining_blocks: i64,
    /// Recent average interval between blocks, in minutes
    pub minutes_between_blocks: f64,
    /// Projected time of the next adjustment
    pub retarget_date: DateTime<Utc>,
    /// Projected difficulty ratio; 1.0 means no change
    pub retarget_multiplier: f64,
}

impl DifficultyProjection {
    /// Projects the next retarget from the chain tip and the epoch's first block.
    ///
    /// The epoch's projected length is the time already elapsed since the
    /// retarget block plus the remaining blocks at `minutes_between_blocks`.
    /// A multiplier above 1.0 means blocks came faster than the two-week
    /// target and difficulty will rise.
    ///
    /// # Example
    /// ```
    /// use mempool_ticker::{BlockRef, DifficultyProjection};
    ///
    /// let last = BlockRef::new(800_000, 1_700_000_000, "tip");
    /// let retarget = BlockRef::new(798_000, 1_700_000_000 - 100_000, "epoch");
    /// let projection = DifficultyProjection::project(&last, &retarget, 10.0).unwrap();
    /// assert_eq!(projection.remaining_blocks, 16);
    /// assert!((projection.retarget_multiplier - 1_209_600.0 / 109_600.0).abs() < 1e-9);
    /// ```
    pub fn project(
        last_block: &BlockRef,
        retarget_block: &BlockRef,
        minutes_between_blocks: f64,
    ) -> Result<Self> {
        let mined_in_epoch =
            (last_block.height as i64).saturating_sub(retarget_block.height as i64);
        let remaining_blocks = (RETARGET_INTERVAL as i64).saturating_sub(mined_in_epoch);

        // Explorer timestamps are unchecked; subtract as floats so extremes cannot overflow
        let elapsed = last_block.timestamp as f64 - retarget_block.timestamp as f64;
        let epoch_duration = minutes_between_blocks * 60.0 * remaining_blocks as f64 + elapsed;

        if epoch_duration.is_nan() || epoch_duration <= 0.0 {
            return Err(TickerError::DegenerateEpochDuration(epoch_duration));
        }

        let retarget_millis = retarget_block.timestamp as f64 * 1000.0 + epoch_duration * 1000.0;
        let retarget_date = DateTime::from_timestamp_millis(retarget_millis.round() as i64)
            .ok_or(TickerError::DegenerateEpochDuration(epoch_duration))?;

        Ok(Self {
            last_retarget_height: retarget_block.height,
            remaining_blocks,
            minutes_between_blocks,
            retarget_date,
            retarget_multiplier: TARGET_EPOCH_SECS / epoch_duration,
        })
    }

    /// Projected difficulty change in percent (`+4.2` means 4.2% harder).
    pub fn retarget_percent(&self) -> f64 {
        self.retarget_multiplier * 100.0 - 100.0
    }

    /// Mean block interval split into whole minutes and seconds.
    pub fn mean_block_time(&self) -> (u64, u64) {
        let secs = (self.minutes_between_blocks * 60.0).max(0.0).round() as u64;
        (secs / 60, secs % 60)
    }
}

/// Average interval in seconds between consecutive blocks, newest first.
///
/// Needs at least two blocks.
pub fn mean_time_diff(recent_blocks: &[BlockRef]) -> Result<f64> {
    if recent_blocks.len() < 2 {
        return Err(TickerError::insufficient_blocks(format!(
            "mean block interval needs at least 2 blocks, got {}",
            recent_blocks.len()
        )));
    }

    let total: f64 = recent_blocks
        .windows(2)
        .map(|pair| pair[0].timestamp as f64 - pair[1].timestamp as f64)
        .sum();

    Ok(total / (recent_blocks.len() - 1) as f64)
}
