use chrono::Utc;
use mempool_ticker::{retarget_height, FeeTable, Snapshot, SnapshotInputs, TickerError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::snapshot_cache::SnapshotCache;
use crate::explorer::{ExplorerApi, ExplorerBackend, FetchError};

/// Refresh errors
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Estimation error: {0}")]
    Estimation(#[from] TickerError),
}

/// Which pre-computed explorer estimates the aggregator may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub upstream_fees: bool,
    pub upstream_difficulty: bool,
}

impl Capabilities {
    /// Compute everything locally.
    pub fn local_only() -> Self {
        Self {
            upstream_fees: false,
            upstream_difficulty: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            upstream_fees: true,
            upstream_difficulty: true,
        }
    }
}

/// Aggregation parameters fixed at construction
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// Fee table slots
    pub fee_slots: usize,
    /// Trailing blocks used for the mean block time
    pub recent_blocks: usize,
    /// Refreshes inside this window are no-ops
    pub min_refresh_interval: Duration,
    pub capabilities: Capabilities,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            fee_slots: FeeTable::DEFAULT_SLOTS,
            recent_blocks: 10,
            min_refresh_interval: Duration::from_secs(60),
            capabilities: Capabilities::default(),
        }
    }
}

/// Result of a successful [`Aggregator::refresh`] call
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// A new snapshot was built and published
    Refreshed(Arc<Snapshot>),
    /// The cached snapshot is still inside the refresh window
    Throttled(Arc<Snapshot>),
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        match self {
            RefreshOutcome::Refreshed(snapshot) | RefreshOutcome::Throttled(snapshot) => snapshot,
        }
    }

    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed(_))
    }
}

/// Fetches raw explorer data and publishes snapshots into a [`SnapshotCache`].
///
/// Only one refresh runs at a time. A refresh either publishes a complete
/// snapshot or leaves the previous one untouched.
pub struct Aggregator<E: ExplorerApi = ExplorerBackend> {
    explorer: E,
    cache: SnapshotCache,
    settings: AggregatorSettings,
    refresh_lock: Mutex<()>,
}

impl<E: ExplorerApi> Aggregator<E> {
    pub fn new(explorer: E, settings: AggregatorSettings) -> Self {
        Self {
            explorer,
            cache: SnapshotCache::new(settings.min_refresh_interval),
            settings,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn explorer(&self) -> &E {
        &self.explorer
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Last published snapshot; `None` until the first successful refresh.
    pub async fn get_data(&self) -> Option<Arc<Snapshot>> {
        self.cache.get().await
    }

    /// Builds and publishes a new snapshot unless the current one is fresh.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let _guard = self.refresh_lock.lock().await;

        // A concurrent caller may have refreshed while we waited on the lock
        if let Some(snapshot) = self.cache.fresh().await {
            debug!("Snapshot still fresh, skipping refresh");
            return Ok(RefreshOutcome::Throttled(snapshot));
        }

        let snapshot = self.aggregate().await?;
        info!(
            "Published snapshot at height {} ({} txs, fastest {:.1} sat/vB, fees {:?}, difficulty {:?})",
            snapshot.height,
            snapshot.count,
            snapshot.fee_recommendation.fastest_fee,
            snapshot.fee_source,
            snapshot.difficulty_source,
        );
        Ok(RefreshOutcome::Refreshed(self.cache.store(snapshot).await))
    }

    /// Runs one full aggregation round without touching the cache.
    async fn aggregate(&self) -> Result<Snapshot, RefreshError> {
        debug!("Aggregating explorer data");
        let caps = self.settings.capabilities;

        let required = async {
            tokio::try_join!(
                self.explorer.tip_height(),
                self.explorer.mempool_blocks(),
                self.explorer.mempool_summary(),
                self.explorer.recent_blocks(self.settings.recent_blocks),
            )
        };
        let upstream_fees = async {
            if !caps.upstream_fees {
                return None;
            }
            match self.explorer.recommended_fees().await {
                Ok(fees) => Some(fees),
                Err(e) => {
                    warn!("Upstream fee recommendation unavailable, computing locally: {}", e);
                    None
                }
            }
        };
        let upstream_difficulty = async {
            if !caps.upstream_difficulty {
                return None;
            }
            match self.explorer.difficulty_adjustment().await {
                Ok(projection) => Some(projection),
                Err(e) => {
                    warn!("Upstream difficulty adjustment unavailable, computing locally: {}", e);
                    None
                }
            }
        };

        let (required, recommended_fees, difficulty) =
            tokio::join!(required, upstream_fees, upstream_difficulty);
        let (height, projected_blocks, mempool, recent_blocks) = required?;

        if projected_blocks.is_empty() {
            return Err(TickerError::EmptyProjectedBlocks.into());
        }
        let last_height = recent_blocks
            .first()
            .map(|block| block.height)
            .ok_or_else(|| TickerError::insufficient_blocks("explorer returned no recent blocks"))?;

        let retarget_block = self
            .explorer
            .block_at_height(retarget_height(last_height))
            .await?;

        let inputs = SnapshotInputs {
            height,
            mempool,
            projected_blocks,
            recent_blocks,
            retarget_block,
            recommended_fees,
            difficulty,
        };
        Ok(Snapshot::build(inputs, self.settings.fee_slots, Utc::now())?)
    }

    /// Refreshes on a fixed cadence until the task is dropped.
    pub async fn run(&self, every: Duration) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Starting snapshot refresher with {:?} interval", every);

        loop {
            ticker.tick().await;

            match self.refresh().await {
                Ok(RefreshOutcome::Refreshed(_)) => {}
                Ok(RefreshOutcome::Throttled(_)) => debug!("Scheduled refresh throttled"),
                // Keep serving the previous snapshot
                Err(e) => error!("Snapshot refresh failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod aggregator_tests;
