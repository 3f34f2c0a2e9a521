//! Mempool Ticker - fee pressure and difficulty-retarget aggregation
//!
//! This library turns raw mempool-explorer data (projected block templates,
//! recent blocks, mempool size) into a display-ready [`Snapshot`] for small
//! ticker screens.
//!
//! # Features
//! - Per-confirmation-target fee table with clamp-to-horizon semantics
//! - Smoothed fastest / half-hour / hour fee recommendation
//! - Next difficulty retarget projection (remaining blocks, date, ratio)
//! - Mempool purging-fee estimate
//!
//! # Example
//! ```
//! use mempool_ticker::{FeeRecommendation, FeeTable, ProjectedBlock};
//!
//! let blocks = vec![
//!     ProjectedBlock::new(vec![12.0, 15.0, 80.0], 998_000.0, 3100).unwrap(),
//!     ProjectedBlock::new(vec![6.0, 8.0, 12.0], 998_000.0, 2900).unwrap(),
//!     ProjectedBlock::new(vec![2.0, 3.0, 6.0], 640_000.0, 1700).unwrap(),
//! ];
//!
//! let table = FeeTable::build(&blocks, FeeTable::DEFAULT_SLOTS).unwrap();
//! let fees = FeeRecommendation::from_projected_blocks(&blocks).unwrap();
//!
//! println!("{table}");
//! println!("{fees}");
//! ```

// Public modules
pub mod error;

// Data structures and estimators
mod difficulty;
mod fee_recommendation;
mod fee_table;
mod mempool_summary;
mod projected_block;
mod snapshot;

// Public exports
pub use difficulty::{
    mean_time_diff, retarget_height, BlockRef, DifficultyProjection, RETARGET_INTERVAL,
    TARGET_EPOCH_SECS,
};
pub use error::{Result, TickerError};
pub use fee_recommendation::{
    smooth_fee, FeeRecommendation, HALF_BLOCK_VSIZE, MIN_RELAY_FEE, NEARLY_FULL_VSIZE,
};
pub use fee_table::FeeTable;
pub use mempool_summary::MempoolSummary;
pub use projected_block::ProjectedBlock;
pub use snapshot::{EstimateSource, Snapshot, SnapshotInputs};
