use serde::Serialize;
use statrs::statistics::{Data, Median};

use crate::error::{Result, TickerError};

/// One entry of the explorer's projected mempool blocks.
///
/// A projected block is the explorer's guess at what a block mined right now
/// (or the n-th block after it) would contain: its fee-rate samples, how much
/// virtual size it accumulates and how many transactions it holds.
///
/// # Example
/// ```
/// use mempool_ticker::ProjectedBlock;
///
/// let block = ProjectedBlock::new(vec![2.0, 5.0, 8.0], 600_000.0, 10).unwrap();
/// assert_eq!(block.min_fee(), 2.0);
/// assert_eq!(block.max_fee(), 8.0);
/// assert_eq!(block.median_fee(), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedBlock {
    fee_range: Vec<f64>,
    block_v_size: f64,
    n_tx: u64,
    median_fee: f64,
}

impl ProjectedBlock {
    /// Creates a projected block, deriving `median_fee` from the fee range.
    pub fn new(fee_range: Vec<f64>, block_vsize: f64, n_tx: u64) -> Result<Self> {
        Self::with_median(fee_range, block_vsize, n_tx, None)
    }

    /// Creates a projected block with an optional explorer-provided median.
    ///
    /// The fee range must be non-empty with finite, non-negative samples; it is
    /// stored in ascending order.
    pub fn with_median(
        mut fee_range: Vec<f64>,
        block_vsize: f64,
        n_tx: u64,
        median_fee: Option<f64>,
    ) -> Result<Self> {
        if fee_range.is_empty() {
            return Err(TickerError::invalid_block("fee range is empty"));
        }
        if fee_range.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(TickerError::invalid_block(
                "fee range contains a negative or non-finite sample",
            ));
        }
        if !block_vsize.is_finite() || block_vsize < 0.0 {
            return Err(TickerError::invalid_block(format!(
                "block vsize {block_vsize} is not a non-negative number"
            )));
        }
        if let Some(median) = median_fee {
            if !median.is_finite() || median < 0.0 {
                return Err(TickerError::invalid_block(format!(
                    "median fee {median} is not a non-negative number"
                )));
            }
        }

        fee_range.sort_by(|a, b| a.total_cmp(b));
        let median_fee = median_fee.unwrap_or_else(|| median_of(&fee_range));

        Ok(Self {
            fee_range,
            block_v_size: block_vsize,
            n_tx,
            median_fee,
        })
    }

    /// Fee-rate samples in sat/vB, ascending.
    pub fn fee_range(&self) -> &[f64] {
        &self.fee_range
    }

    /// Virtual size accumulated into this template, in vbytes.
    pub fn block_vsize(&self) -> f64 {
        self.block_v_size
    }

    /// Number of transactions in this template.
    pub fn n_tx(&self) -> u64 {
        self.n_tx
    }

    /// Median fee as provided by the explorer, or derived from the fee range.
    pub fn median_fee(&self) -> f64 {
        self.median_fee
    }

    /// Lowest fee-rate sample.
    pub fn min_fee(&self) -> f64 {
        self.fee_range[0]
    }

    /// Highest fee-rate sample.
    pub fn max_fee(&self) -> f64 {
        self.fee_range[self.fee_range.len() - 1]
    }

    /// Median of the fee range itself, ignoring any explorer-provided median.
    pub fn range_median(&self) -> f64 {
        median_of(&self.fee_range)
    }
}

fn median_of(samples: &[f64]) -> f64 {
    Data::new(samples.to_vec()).median()
}
