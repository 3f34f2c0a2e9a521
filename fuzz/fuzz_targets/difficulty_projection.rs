#![no_main]

use libfuzzer_sys::fuzz_target;
use mempool_ticker::{mean_time_diff, retarget_height, BlockRef, DifficultyProjection};

fuzz_target!(|data: &[u8]| {
    if data.len() < 28 {
        return;
    }

    let word = |at: usize| -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&data[at..at + 8]);
        bytes
    };
    let height = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as u64;
    let last_ts = i64::from_le_bytes(word(4));
    let retarget_ts = i64::from_le_bytes(word(12));
    let minutes = f64::from_le_bytes(word(20));

    let last = BlockRef::new(height, last_ts, "last");
    let retarget = BlockRef::new(retarget_height(height), retarget_ts, "retarget");

    // Degenerate epochs must surface as errors, never as NaN
    if let Ok(projection) = DifficultyProjection::project(&last, &retarget, minutes) {
        assert!(projection.retarget_multiplier > 0.0);
        assert!(projection.remaining_blocks >= 1);
    }

    let blocks: Vec<BlockRef> = data[28..]
        .chunks_exact(8)
        .enumerate()
        .map(|(i, c)| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(c);
            let ts = i64::from_le_bytes(bytes);
            BlockRef::new(height.saturating_sub(i as u64), ts, "b")
        })
        .collect();
    let _ = mean_time_diff(&blocks);
});
