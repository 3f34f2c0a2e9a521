use chrono::{DateTime, Utc};
use mempool_ticker::{
    retarget_height, BlockRef, DifficultyProjection, FeeRecommendation, MempoolSummary,
    ProjectedBlock, RETARGET_INTERVAL,
};

use super::FetchError;

const MOCK_TIP: u64 = 850_000;
const MOCK_BLOCK_INTERVAL: i64 = 600;

/// Mock explorer for offline renderer development
#[derive(Debug, Clone, Default)]
pub struct MockExplorerClient;

impl MockExplorerClient {
    pub fn new() -> Self {
        Self
    }

    /// Test connection (always succeeds in mock mode)
    pub async fn test_connection(&self) -> Result<(), FetchError> {
        Ok(())
    }

    pub async fn tip_height(&self) -> Result<u64, FetchError> {
        Ok(MOCK_TIP)
    }

    pub async fn mempool_blocks(&self) -> Result<Vec<ProjectedBlock>, FetchError> {
        let templates: [(&[f64], f64, u64); 4] = [
            (&[12.0, 13.0, 15.0, 19.0, 32.0, 150.0], 997_900.0, 3200),
            (&[8.0, 9.0, 10.0, 11.0, 12.0], 997_800.0, 2800),
            (&[4.0, 5.0, 6.0, 7.0, 8.0], 997_950.0, 2500),
            (&[1.0, 1.5, 2.0, 3.0, 4.0], 640_000.0, 1900),
        ];
        Ok(templates
            .into_iter()
            .filter_map(|(fees, vsize, n_tx)| ProjectedBlock::new(fees.to_vec(), vsize, n_tx).ok())
            .collect())
    }

    pub async fn mempool_summary(&self) -> Result<MempoolSummary, FetchError> {
        Ok(MempoolSummary::new(
            9_500,
            3_633_650,
            21_000_000,
            vec![(32.0, 400_000), (15.0, 600_000), (10.0, 1_000_000), (5.0, 1_000_000), (2.0, 633_650)],
        ))
    }

    /// Blocks ten minutes apart, the newest mined five minutes ago
    pub async fn recent_blocks(&self, count: usize) -> Result<Vec<BlockRef>, FetchError> {
        let newest = Utc::now().timestamp() - 300;
        Ok((0..count as u64)
            .map(|i| {
                let height = MOCK_TIP - i;
                BlockRef::new(height, newest - i as i64 * MOCK_BLOCK_INTERVAL, mock_hash(height))
            })
            .collect())
    }

    /// The epoch is assumed to have run exactly on schedule
    pub async fn block_at_height(&self, height: u64) -> Result<BlockRef, FetchError> {
        let newest = Utc::now().timestamp() - 300;
        let behind = MOCK_TIP.saturating_sub(height) as i64;
        Ok(BlockRef::new(
            height,
            newest - behind * MOCK_BLOCK_INTERVAL,
            mock_hash(height),
        ))
    }

    pub async fn recommended_fees(&self) -> Result<FeeRecommendation, FetchError> {
        Ok(FeeRecommendation::new(19.0, 14.0, 8.0))
    }

    pub async fn difficulty_adjustment(&self) -> Result<DifficultyProjection, FetchError> {
        let epoch_start = retarget_height(MOCK_TIP);
        let remaining_blocks = (epoch_start + RETARGET_INTERVAL - MOCK_TIP) as i64;
        let newest = Utc::now().timestamp() - 300;
        let retarget_date = DateTime::from_timestamp(newest + remaining_blocks * MOCK_BLOCK_INTERVAL, 0)
            .unwrap_or_else(Utc::now);
        Ok(DifficultyProjection {
            last_retarget_height: epoch_start,
            remaining_blocks,
            minutes_between_blocks: MOCK_BLOCK_INTERVAL as f64 / 60.0,
            retarget_date,
            retarget_multiplier: 1.0,
        })
    }
}

fn mock_hash(height: u64) -> String {
    format!("{height:064x}")
}
