use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::{mean_time_diff, BlockRef, DifficultyProjection};
use crate::error::{Result, TickerError};
use crate::fee_recommendation::FeeRecommendation;
use crate::fee_table::FeeTable;
use crate::mempool_summary::MempoolSummary;
use crate::projected_block::ProjectedBlock;

/// Where an estimate in a [`Snapshot`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    /// Pre-computed by the explorer
    Upstream,
    /// Computed locally from raw chain and mempool data
    Local,
}

/// Raw inputs of one aggregation round.
///
/// `recommended_fees` and `difficulty` are the explorer's own estimates and
/// take precedence over local computation when present.
#[derive(Debug, Clone)]
pub struct SnapshotInputs {
    pub height: u64,
    pub mempool: MempoolSummary,
    pub projected_blocks: Vec<ProjectedBlock>,
    /// Newest first; the first entry is the last mined block
    pub recent_blocks: Vec<BlockRef>,
    pub retarget_block: BlockRef,
    pub recommended_fees: Option<FeeRecommendation>,
    pub difficulty: Option<DifficultyProjection>,
}

/// One fully aggregated view of mempool and chain state.
///
/// Snapshots are never modified after construction; a newer one replaces an
/// older one as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Chain tip height
    pub height: u64,
    /// Mempool transaction count
    pub count: u64,
    /// Mempool virtual size, vbytes
    pub vsize: u64,
    /// Full blocks needed to clear the mempool
    pub blocks_to_clear: u64,
    pub fee_table: FeeTable,
    pub fee_recommendation: FeeRecommendation,
    pub fee_source: EstimateSource,
    /// Lowest fee rate surviving a default-sized node mempool
    pub purging_fee: Option<f64>,
    pub last_block: BlockRef,
    pub retarget_block: BlockRef,
    pub difficulty: DifficultyProjection,
    pub difficulty_source: EstimateSource,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Aggregates one round of raw inputs into a snapshot.
    ///
    /// Fails without producing anything when the mempool has no projected
    /// blocks, when no recent block is known, or when the difficulty epoch
    /// cannot be projected.
    pub fn build(inputs: SnapshotInputs, fee_slots: usize, taken_at: DateTime<Utc>) -> Result<Self> {
        let SnapshotInputs {
            height,
            mempool,
            projected_blocks,
            recent_blocks,
            retarget_block,
            recommended_fees,
            difficulty,
        } = inputs;

        if projected_blocks.is_empty() {
            return Err(TickerError::EmptyProjectedBlocks);
        }
        let last_block = recent_blocks
            .first()
            .cloned()
            .ok_or_else(|| TickerError::insufficient_blocks("no recent blocks"))?;

        let fee_table = FeeTable::build(&projected_blocks, fee_slots)?;

        let (fee_recommendation, fee_source) = match recommended_fees {
            Some(fees) => (fees, EstimateSource::Upstream),
            None => (
                FeeRecommendation::from_projected_blocks(&projected_blocks)?,
                EstimateSource::Local,
            ),
        };

        let (difficulty, difficulty_source) = match difficulty {
            Some(projection) => (projection, EstimateSource::Upstream),
            None => {
                let minutes = mean_time_diff(&recent_blocks)? / 60.0;
                (
                    DifficultyProjection::project(&last_block, &retarget_block, minutes)?,
                    EstimateSource::Local,
                )
            }
        };

        Ok(Self {
            height,
            count: mempool.count,
            vsize: mempool.vsize,
            blocks_to_clear: mempool.blocks_to_clear(),
            purging_fee: mempool.purging_fee(),
            fee_table,
            fee_recommendation,
            fee_source,
            last_block,
            retarget_block,
            difficulty,
            difficulty_source,
            taken_at,
        })
    }

    /// Seconds between the last block's timestamp and when this snapshot was taken.
    pub fn last_block_age_secs(&self) -> i64 {
        self.taken_at.timestamp().saturating_sub(self.last_block.timestamp)
    }

    /// Projected difficulty change in percent.
    pub fn retarget_percent(&self) -> f64 {
        self.difficulty.retarget_percent()
    }
}
