//! Property-based tests for the fee estimator
//!
//! These tests check the invariants the renderer relies on for any shape of
//! projected mempool: the fee table never extrapolates past the last known
//! block and recommendations never drop below the relay floor.

use mempool_ticker::{
    smooth_fee, FeeRecommendation, FeeTable, ProjectedBlock, HALF_BLOCK_VSIZE, MIN_RELAY_FEE,
};
use proptest::prelude::*;

const MAX_FEE_RATE: f64 = 2_000.0;
const MAX_VSIZE: f64 = 1_100_000.0;

/// Generate one projected block with a random fee range and size
fn projected_block_strategy() -> impl Strategy<Value = ProjectedBlock> {
    (
        prop::collection::vec(0.0..MAX_FEE_RATE, 1..30),
        0.0..MAX_VSIZE,
        1u64..5000,
        prop::option::of(0.0..MAX_FEE_RATE),
    )
        .prop_map(|(fee_range, vsize, n_tx, median)| {
            ProjectedBlock::with_median(fee_range, vsize, n_tx, median).unwrap()
        })
}

/// Generate the explorer's projected block list (never empty)
fn projected_blocks_strategy() -> impl Strategy<Value = Vec<ProjectedBlock>> {
    prop::collection::vec(projected_block_strategy(), 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Slots past the horizon repeat the last known block
    #[test]
    fn test_clamp_invariant(blocks in projected_blocks_strategy(), slots in 1usize..16) {
        let table = FeeTable::build(&blocks, slots).unwrap();
        prop_assert_eq!(table.len(), slots);
        prop_assert_eq!(table.median_fee.len(), slots);
        prop_assert_eq!(table.max_fee.len(), slots);

        let k = blocks.len();
        if k < slots {
            let last = table.slot(k - 1).unwrap();
            for i in k - 1..slots {
                prop_assert_eq!(table.slot(i).unwrap(), last);
            }
        }
    }

    /// Each slot is ordered min <= median <= max
    #[test]
    fn test_slot_ordering(blocks in projected_blocks_strategy()) {
        let table = FeeTable::build(&blocks, FeeTable::DEFAULT_SLOTS).unwrap();
        for i in 0..table.len() {
            let (min, median, max) = table.slot(i).unwrap();
            prop_assert!(min <= median && median <= max);
        }
    }

    /// smooth_fee never returns less than the relay floor
    #[test]
    fn test_floor_invariant(
        block in projected_block_strategy(),
        next in prop::option::of(projected_block_strategy()),
        previous in prop::option::of(0.0..MAX_FEE_RATE),
    ) {
        let fee = smooth_fee(&block, next.as_ref(), previous);
        prop_assert!(fee >= MIN_RELAY_FEE, "fee {} below floor", fee);
        prop_assert!(fee.is_finite());
    }

    /// A template of exactly half a block yields exactly the floor
    #[test]
    fn test_half_full_rule(
        median in 0.0..MAX_FEE_RATE,
        previous in prop::option::of(0.0..MAX_FEE_RATE),
        with_next in any::<bool>(),
    ) {
        let block = ProjectedBlock::with_median(vec![median], HALF_BLOCK_VSIZE, 10, Some(median)).unwrap();
        let next = ProjectedBlock::new(vec![1.0], 1_000_000.0, 10).unwrap();
        let next = if with_next { Some(&next) } else { None };
        prop_assert_eq!(smooth_fee(&block, next, previous), 1.0);
    }

    /// Every tier of the recommendation respects the floor, however many blocks exist
    #[test]
    fn test_recommendation_floor(blocks in projected_blocks_strategy()) {
        let fees = FeeRecommendation::from_projected_blocks(&blocks).unwrap();
        prop_assert!(fees.fastest_fee >= MIN_RELAY_FEE);
        prop_assert!(fees.half_hour_fee >= MIN_RELAY_FEE);
        prop_assert!(fees.hour_fee >= MIN_RELAY_FEE);
        if blocks.len() == 1 {
            prop_assert_eq!(fees.half_hour_fee, 1.0);
        }
        if blocks.len() <= 2 {
            prop_assert_eq!(fees.hour_fee, 1.0);
        }
    }
}
