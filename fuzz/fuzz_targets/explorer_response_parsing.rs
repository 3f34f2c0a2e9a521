#![no_main]

use libfuzzer_sys::fuzz_target;
use mempool_ticker_server::explorer::models::{
    parse_block, parse_block_hash, parse_blocks, parse_difficulty_adjustment, parse_mempool,
    parse_mempool_blocks, parse_recommended_fees, parse_tip_height,
};

// Fuzz explorer response parsing: any body is either parsed or rejected
fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_tip_height(body);
    let _ = parse_block(body);
    let _ = parse_blocks(body);
    let _ = parse_recommended_fees(body);
    let _ = parse_difficulty_adjustment(body);
    let _ = parse_mempool(body);

    if let Ok(hash) = parse_block_hash(body) {
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    if let Ok(blocks) = parse_mempool_blocks(body) {
        for block in &blocks {
            assert!(block.min_fee() <= block.max_fee());
            assert!(block.block_vsize() >= 0.0);
        }
    }

    if let Ok(mempool) = parse_mempool(body) {
        let _ = mempool.blocks_to_clear();
        let _ = mempool.purging_fee();
    }
});
