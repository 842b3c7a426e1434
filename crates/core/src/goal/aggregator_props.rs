//! Property-based tests for goal progress.

use proptest::prelude::*;

use crate::goal::aggregator::GoalAggregator;
use crate::goal::aggregator::tests::{empty_goal, kr_input, scope};
use crate::measure::{MeasureSeed, ValueRange};
use crate::ordering::MoveDirection;
use crate::quarter::QuarterStatus;

/// Strategy for a key result's weight and current value on a 0..100 range.
fn arb_key_result() -> impl Strategy<Value = (u32, i64)> {
    (0u32..=100, -20i64..=120)
}

fn arb_direction() -> impl Strategy<Value = MoveDirection> {
    prop_oneof![Just(MoveDirection::Up), Just(MoveDirection::Down)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Goal progress does not depend on key result order.
    #[test]
    fn prop_progress_invariant_under_reordering(
        krs in prop::collection::vec(arb_key_result(), 1..6),
        moves in prop::collection::vec((0usize..6, arb_direction()), 0..10),
    ) {
        let open = scope(QuarterStatus::Forming);
        let mut goal = empty_goal();
        for (i, (weight, current)) in krs.iter().enumerate() {
            let measure = MeasureSeed::Linear(ValueRange::new(0.into(), 100.into(), (*current).into()));
            GoalAggregator::add_key_result(&open, &mut goal, kr_input(&format!("kr{i}"), *weight, Some(measure)))
                .unwrap();
        }
        let before = GoalAggregator::progress(&goal);

        for (pick, direction) in moves {
            let id = goal.key_results[pick % goal.key_results.len()].id;
            GoalAggregator::move_key_result(&open, &mut goal, id, direction).unwrap();
        }

        prop_assert_eq!(GoalAggregator::progress(&goal), before);
    }

    /// Reordering keeps order indexes a permutation of the original ones.
    #[test]
    fn prop_reordering_preserves_order_indexes(
        count in 1usize..6,
        moves in prop::collection::vec((0usize..6, arb_direction()), 0..10),
    ) {
        let open = scope(QuarterStatus::Forming);
        let mut goal = empty_goal();
        for i in 0..count {
            GoalAggregator::add_key_result(&open, &mut goal, kr_input(&format!("kr{i}"), 10, None)).unwrap();
        }
        for (pick, direction) in moves {
            let id = goal.key_results[pick % count].id;
            GoalAggregator::move_key_result(&open, &mut goal, id, direction).unwrap();
        }
        let mut order: Vec<u32> = goal.key_results.iter().map(|kr| kr.order_index).collect();
        order.sort_unstable();
        let expected: Vec<u32> = (0..u32::try_from(count).unwrap()).collect();
        prop_assert_eq!(order, expected);
    }
}
