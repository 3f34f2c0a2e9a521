use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TickerError};
use crate::projected_block::ProjectedBlock;

/// Per-confirmation-target fee table.
///
/// Slot `i` describes the fee rates of the `i`-th projected block. All three
/// columns always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTable {
    /// Lowest fee rate per slot, sat/vB
    pub min_fee: Vec<f64>,
    /// Median fee rate per slot, sat/vB
    pub median_fee: Vec<f64>,
    /// Highest fee rate per slot, sat/vB
    pub max_fee: Vec<f64>,
}

impl FeeTable {
    /// Default number of confirmation-target slots.
    pub const DEFAULT_SLOTS: usize = 7;

    /// Builds a table of `slots` entries from the projected blocks.
    ///
    /// Slots past the last projected block repeat the last block's values:
    /// nothing beyond the known horizon confirms faster than the last known
    /// block.
    ///
    /// # Example
    /// ```
    /// use mempool_ticker::{FeeTable, ProjectedBlock};
    ///
    /// let blocks = vec![
    ///     ProjectedBlock::new(vec![10.0, 20.0, 30.0], 1_000_000.0, 100).unwrap(),
    ///     ProjectedBlock::new(vec![2.0, 4.0, 6.0], 400_000.0, 50).unwrap(),
    /// ];
    /// let table = FeeTable::build(&blocks, 4).unwrap();
    /// assert_eq!(table.min_fee, vec![10.0, 2.0, 2.0, 2.0]);
    /// ```
    pub fn build(blocks: &[ProjectedBlock], slots: usize) -> Result<Self> {
        if blocks.is_empty() {
            return Err(TickerError::EmptyProjectedBlocks);
        }
        if slots == 0 {
            return Err(TickerError::invalid_config(
                "fee table needs at least one slot",
            ));
        }

        let last = blocks.len() - 1;
        let mut table = Self {
            min_fee: Vec::with_capacity(slots),
            median_fee: Vec::with_capacity(slots),
            max_fee: Vec::with_capacity(slots),
        };

        for slot in 0..slots {
            let block = &blocks[slot.min(last)];
            table.min_fee.push(block.min_fee());
            table.median_fee.push(block.range_median());
            table.max_fee.push(block.max_fee());
        }

        Ok(table)
    }

    /// Number of slots in the table.
    pub fn len(&self) -> usize {
        self.min_fee.len()
    }

    /// Returns true if the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.min_fee.is_empty()
    }

    /// Returns `(min, median, max)` for one slot.
    pub fn slot(&self, index: usize) -> Option<(f64, f64, f64)> {
        Some((
            *self.min_fee.get(index)?,
            *self.median_fee.get(index)?,
            *self.max_fee.get(index)?,
        ))
    }
}

impl fmt::Display for FeeTable {
    /// Renders the minimum fees as a dash-separated row, e.g. `1.0-2.0-3.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fee) in self.min_fee.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{fee:.1}")?;
        }
        Ok(())
    }
}
