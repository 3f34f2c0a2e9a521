//! Background services: snapshot aggregation and caching

mod aggregator;
mod snapshot_cache;

pub use aggregator::{
    Aggregator, AggregatorSettings, Capabilities, RefreshError, RefreshOutcome,
};
pub use snapshot_cache::SnapshotCache;
