use mempool_ticker::{BlockRef, DifficultyProjection, FeeRecommendation, MempoolSummary, ProjectedBlock};
use tracing::{debug, info};

use super::models::{
    parse_block, parse_block_hash, parse_blocks, parse_difficulty_adjustment, parse_mempool,
    parse_mempool_blocks, parse_recommended_fees, parse_tip_height,
};
use super::resolver::{EndpointResolver, FetchError};

/// Typed client for a mempool.space-compatible explorer REST API.
///
/// Every call goes through the [`EndpointResolver`], which owns retries and
/// mirror fallback; the client itself never retries.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    resolver: EndpointResolver,
}

impl ExplorerClient {
    pub fn new(resolver: EndpointResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Height of the chain tip
    pub async fn tip_height(&self) -> Result<u64, FetchError> {
        let height = self
            .resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await?;
        debug!("Current tip height: {}", height);
        Ok(height)
    }

    /// Projected mempool blocks, highest fee first
    pub async fn mempool_blocks(&self) -> Result<Vec<ProjectedBlock>, FetchError> {
        let blocks = self
            .resolver
            .fetch("v1/fees/mempool-blocks", parse_mempool_blocks)
            .await?;
        debug!("Fetched {} projected mempool blocks", blocks.len());
        Ok(blocks)
    }

    /// The explorer's own fee recommendation
    pub async fn recommended_fees(&self) -> Result<FeeRecommendation, FetchError> {
        self.resolver
            .fetch("v1/fees/recommended", parse_recommended_fees)
            .await
    }

    /// The explorer's own difficulty adjustment projection
    pub async fn difficulty_adjustment(&self) -> Result<DifficultyProjection, FetchError> {
        self.resolver
            .fetch("v1/difficulty-adjustment", parse_difficulty_adjustment)
            .await
    }

    /// Mempool size and fee histogram
    pub async fn mempool_summary(&self) -> Result<MempoolSummary, FetchError> {
        let summary = self.resolver.fetch("mempool", parse_mempool).await?;
        debug!(
            "Mempool holds {} transactions, {} vB",
            summary.count, summary.vsize
        );
        Ok(summary)
    }

    /// Up to `count` most recent blocks, newest first.
    ///
    /// The explorer pages blocks ten at a time; further pages are requested
    /// below the lowest height seen so far.
    pub async fn recent_blocks(&self, count: usize) -> Result<Vec<BlockRef>, FetchError> {
        let mut blocks: Vec<BlockRef> = self.resolver.fetch("blocks", parse_blocks).await?;

        while blocks.len() < count {
            let lowest = match blocks.last() {
                Some(block) if block.height > 0 => block.height,
                _ => break,
            };
            let page = self
                .resolver
                .fetch(&format!("blocks/{}", lowest - 1), parse_blocks)
                .await?;
            if page.is_empty() {
                break;
            }
            blocks.extend(page);
        }

        blocks.truncate(count);
        debug!("Fetched {} recent blocks", blocks.len());
        Ok(blocks)
    }

    pub async fn block_hash_at(&self, height: u64) -> Result<String, FetchError> {
        self.resolver
            .fetch(&format!("block-height/{height}"), parse_block_hash)
            .await
    }

    pub async fn block(&self, hash: &str) -> Result<BlockRef, FetchError> {
        self.resolver
            .fetch(&format!("block/{hash}"), parse_block)
            .await
    }

    /// Looks up the block at `height` via its hash.
    pub async fn block_at_height(&self, height: u64) -> Result<BlockRef, FetchError> {
        let hash = self.block_hash_at(height).await?;
        self.block(&hash).await
    }

    /// Checks that at least one endpoint answers.
    pub async fn test_connection(&self) -> Result<(), FetchError> {
        let height = self.tip_height().await?;
        info!("Explorer reachable, tip height {}", height);
        Ok(())
    }
}
