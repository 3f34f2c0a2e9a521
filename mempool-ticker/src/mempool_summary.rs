use serde::{Deserialize, Serialize};

/// Default node mempool limit in MB (`-maxmempool`).
const DEFAULT_MAX_MEMPOOL_MB: f64 = 300.0;

/// Approximate in-memory bytes per vbyte of a mempool transaction.
const MEMORY_PER_VBYTE: f64 = 3.99;

/// Aggregate size of the mempool as reported by the explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolSummary {
    /// Number of unconfirmed transactions
    pub count: u64,
    /// Total virtual size, vbytes
    pub vsize: u64,
    /// Sum of fees, sats
    pub total_fee: u64,
    /// `(fee_rate, vsize)` pairs, highest fee rate first
    pub fee_histogram: Vec<(f64, u64)>,
}

impl MempoolSummary {
    /// Creates a summary from the explorer's mempool totals and fee histogram.
    pub fn new(count: u64, vsize: u64, total_fee: u64, fee_histogram: Vec<(f64, u64)>) -> Self {
        Self {
            count,
            vsize,
            total_fee,
            fee_histogram,
        }
    }

    /// Number of full 1 MvB blocks needed to clear the mempool.
    pub fn blocks_to_clear(&self) -> u64 {
        self.vsize.div_ceil(1_000_000)
    }

    /// Lowest fee rate that still fits in a default-sized node mempool.
    ///
    /// Walks the histogram from the highest fee rate down and returns the last
    /// bucket whose cumulative size stays under the 300 MB limit. `None` when
    /// the first bucket alone exceeds the limit or the histogram is empty.
    pub fn purging_fee(&self) -> Option<f64> {
        let mut cumulative = 0u64;
        let mut threshold = None;
        for &(fee_rate, vsize) in &self.fee_histogram {
            cumulative = cumulative.saturating_add(vsize);
            let memory_mb = cumulative as f64 / 1024.0 / 1024.0 * MEMORY_PER_VBYTE;
            if memory_mb < DEFAULT_MAX_MEMPOOL_MB {
                threshold = Some(fee_rate);
            }
        }
        threshold
    }
}
