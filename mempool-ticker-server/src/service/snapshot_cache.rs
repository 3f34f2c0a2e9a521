use mempool_ticker::Snapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Default)]
struct CacheState {
    snapshot: Option<Arc<Snapshot>>,
    stored_at: Option<Instant>,
}

/// Holds the last successfully aggregated snapshot.
///
/// The snapshot and the instant it was stored are swapped together under one
/// write lock, so readers always get a complete snapshot.
pub struct SnapshotCache {
    state: RwLock<CacheState>,
    min_refresh_interval: Duration,
}

impl SnapshotCache {
    pub fn new(min_refresh_interval: Duration) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            min_refresh_interval,
        }
    }

    pub fn min_refresh_interval(&self) -> Duration {
        self.min_refresh_interval
    }

    /// Latest snapshot, however old; `None` before the first store.
    pub async fn get(&self) -> Option<Arc<Snapshot>> {
        self.state.read().await.snapshot.clone()
    }

    /// Latest snapshot if it was stored within the refresh interval.
    pub async fn fresh(&self) -> Option<Arc<Snapshot>> {
        let state = self.state.read().await;
        match (&state.snapshot, state.stored_at) {
            (Some(snapshot), Some(stored_at))
                if stored_at.elapsed() < self.min_refresh_interval =>
            {
                Some(snapshot.clone())
            }
            _ => None,
        }
    }

    /// Time since the last store.
    pub async fn age(&self) -> Option<Duration> {
        self.state.read().await.stored_at.map(|at| at.elapsed())
    }

    /// Replaces the cached snapshot and restarts the refresh interval.
    pub async fn store(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut state = self.state.write().await;
        state.snapshot = Some(snapshot.clone());
        state.stored_at = Some(Instant::now());
        snapshot
    }
}
