use async_trait::async_trait;
use mempool_ticker::{BlockRef, DifficultyProjection, FeeRecommendation, MempoolSummary, ProjectedBlock};

use super::{ExplorerClient, FetchError, MockExplorerClient};

/// Raw data fetchers the aggregator depends on
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Check that the explorer answers
    async fn test_connection(&self) -> Result<(), FetchError>;

    async fn tip_height(&self) -> Result<u64, FetchError>;

    async fn mempool_blocks(&self) -> Result<Vec<ProjectedBlock>, FetchError>;

    async fn mempool_summary(&self) -> Result<MempoolSummary, FetchError>;

    /// Up to `count` most recent blocks, newest first
    async fn recent_blocks(&self, count: usize) -> Result<Vec<BlockRef>, FetchError>;

    async fn block_at_height(&self, height: u64) -> Result<BlockRef, FetchError>;

    async fn recommended_fees(&self) -> Result<FeeRecommendation, FetchError>;

    async fn difficulty_adjustment(&self) -> Result<DifficultyProjection, FetchError>;
}

/// Wrapper enum for real or mock explorer
#[derive(Debug, Clone)]
pub enum ExplorerBackend {
    Real(ExplorerClient),
    Mock(MockExplorerClient),
}

macro_rules! dispatch {
    ($self:ident, $client:ident => $call:expr) => {
        match $self {
            ExplorerBackend::Real($client) => $call,
            ExplorerBackend::Mock($client) => $call,
        }
    };
}

#[async_trait]
impl ExplorerApi for ExplorerBackend {
    async fn test_connection(&self) -> Result<(), FetchError> {
        dispatch!(self, client => client.test_connection().await)
    }

    async fn tip_height(&self) -> Result<u64, FetchError> {
        dispatch!(self, client => client.tip_height().await)
    }

    async fn mempool_blocks(&self) -> Result<Vec<ProjectedBlock>, FetchError> {
        dispatch!(self, client => client.mempool_blocks().await)
    }

    async fn mempool_summary(&self) -> Result<MempoolSummary, FetchError> {
        dispatch!(self, client => client.mempool_summary().await)
    }

    async fn recent_blocks(&self, count: usize) -> Result<Vec<BlockRef>, FetchError> {
        dispatch!(self, client => client.recent_blocks(count).await)
    }

    async fn block_at_height(&self, height: u64) -> Result<BlockRef, FetchError> {
        dispatch!(self, client => client.block_at_height(height).await)
    }

    async fn recommended_fees(&self) -> Result<FeeRecommendation, FetchError> {
        dispatch!(self, client => client.recommended_fees().await)
    }

    async fn difficulty_adjustment(&self) -> Result<DifficultyProjection, FetchError> {
        dispatch!(self, client => client.difficulty_adjustment().await)
    }
}
