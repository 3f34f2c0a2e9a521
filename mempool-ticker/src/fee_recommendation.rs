use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TickerError};
use crate::projected_block::ProjectedBlock;

/// Minimum relay fee in sat/vB; no recommendation goes below it.
pub const MIN_RELAY_FEE: f64 = 1.0;

/// Templates at or below this vsize carry no fee pressure.
pub const HALF_BLOCK_VSIZE: f64 = 500_000.0;

/// Templates above this vsize are treated as full blocks.
pub const NEARLY_FULL_VSIZE: f64 = 950_000.0;

/// Three-tier fee recommendation in sat/vB.
///
/// Tiers are non-increasing by convention (fastest ≥ half-hour ≥ hour) but
/// the ordering is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecommendation {
    /// Next block (~10 minutes)
    pub fastest_fee: f64,
    /// Within ~3 blocks
    pub half_hour_fee: f64,
    /// Within ~6 blocks
    pub hour_fee: f64,
}

impl FeeRecommendation {
    /// Creates a recommendation from explicit tier values.
    pub fn new(fastest_fee: f64, half_hour_fee: f64, hour_fee: f64) -> Self {
        Self {
            fastest_fee,
            half_hour_fee,
            hour_fee,
        }
    }

    /// Builds a recommendation by chaining [`smooth_fee`] over the first three
    /// projected blocks.
    ///
    /// Each tier's output is fed to the next tier as its previous fee. Tiers
    /// with no projected block to smooth from fall back to
    /// [`MIN_RELAY_FEE`].
    ///
    /// # Example
    /// ```
    /// use mempool_ticker::{FeeRecommendation, ProjectedBlock};
    ///
    /// let blocks = vec![
    ///     ProjectedBlock::with_median(vec![20.0], 980_000.0, 3000, Some(20.0)).unwrap(),
    ///     ProjectedBlock::with_median(vec![15.0], 980_000.0, 3000, Some(15.0)).unwrap(),
    /// ];
    /// let fees = FeeRecommendation::from_projected_blocks(&blocks).unwrap();
    /// assert_eq!(fees.fastest_fee, 20.0);
    /// assert_eq!(fees.half_hour_fee, 17.5);
    /// assert_eq!(fees.hour_fee, 1.0);
    /// ```
    pub fn from_projected_blocks(blocks: &[ProjectedBlock]) -> Result<Self> {
        let first = blocks.first().ok_or(TickerError::EmptyProjectedBlocks)?;

        let fastest_fee = smooth_fee(first, blocks.get(1), None);

        let half_hour_fee = match blocks.get(1) {
            Some(block) => smooth_fee(block, blocks.get(2), Some(fastest_fee)),
            None => MIN_RELAY_FEE,
        };

        let hour_fee = match blocks.get(2) {
            Some(block) => smooth_fee(block, blocks.get(3), Some(half_hour_fee)),
            None => MIN_RELAY_FEE,
        };

        Ok(Self {
            fastest_fee,
            half_hour_fee,
            hour_fee,
        })
    }
}

impl fmt::Display for FeeRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "low: {:.1} med: {:.1} high: {:.1}",
            self.hour_fee, self.half_hour_fee, self.fastest_fee
        )
    }
}

/// Smooths the median fee of one projected block into a recommendation.
///
/// * with a previous tier fee, the base is the average of both medians;
/// * a template of at most half a block means no pressure: [`MIN_RELAY_FEE`];
/// * a not-quite-full *last* template scales the base down linearly between
///   half and full;
/// * otherwise the base stands.
///
/// The result is never below [`MIN_RELAY_FEE`].
pub fn smooth_fee(
    block: &ProjectedBlock,
    next_block: Option<&ProjectedBlock>,
    previous_fee: Option<f64>,
) -> f64 {
    let base = match previous_fee {
        Some(previous) => (block.median_fee() + previous) / 2.0,
        None => block.median_fee(),
    };

    let vsize = block.block_vsize();
    if vsize <= HALF_BLOCK_VSIZE {
        return MIN_RELAY_FEE;
    }

    if vsize <= NEARLY_FULL_VSIZE && next_block.is_none() {
        let multiplier = (vsize - HALF_BLOCK_VSIZE) / HALF_BLOCK_VSIZE;
        return (base * multiplier).max(MIN_RELAY_FEE);
    }

    // Sub-1 medians exist on quiet mempools; keep the relay floor.
    base.max(MIN_RELAY_FEE)
}
