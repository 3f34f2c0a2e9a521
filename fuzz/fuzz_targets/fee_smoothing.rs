#![no_main]

use libfuzzer_sys::fuzz_target;
use mempool_ticker::{FeeRecommendation, FeeTable, ProjectedBlock, MIN_RELAY_FEE};

fuzz_target!(|data: &[u8]| {
    // Each template takes 16 bytes: two fee rates and a vsize
    let mut blocks = Vec::new();
    for chunk in data.chunks_exact(16).take(32) {
        let low = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64;
        let high = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as f64;
        let vsize = u64::from_le_bytes([
            chunk[8], chunk[9], chunk[10], chunk[11],
            chunk[12], chunk[13], chunk[14], chunk[15],
        ]) % 4_000_000;

        // Invalid ranges must be rejected, never panic
        if let Ok(block) = ProjectedBlock::new(vec![low, high], vsize as f64, 1) {
            blocks.push(block);
        }
    }

    match FeeRecommendation::from_projected_blocks(&blocks) {
        Ok(fees) => {
            assert!(!blocks.is_empty());
            assert!(fees.fastest_fee >= MIN_RELAY_FEE);
            assert!(fees.half_hour_fee >= MIN_RELAY_FEE);
            assert!(fees.hour_fee >= MIN_RELAY_FEE);
        }
        Err(_) => assert!(blocks.is_empty()),
    }

    for slots in [1, FeeTable::DEFAULT_SLOTS, 40] {
        if let Ok(table) = FeeTable::build(&blocks, slots) {
            assert_eq!(table.len(), slots);
        }
    }
});
