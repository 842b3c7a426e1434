//! Property-based tests for MeasureEngine.

use okrs_shared::StageId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::MeasureEngine;
use super::types::{Checkpoint, Stage, ValueRange};

/// Strategy for measure values with two decimal places.
fn arb_value() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for any representable decimal, extremes included.
fn arb_full_value() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::MIN),
        Just(Decimal::MAX),
        (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
            .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale)),
    ]
}

/// Strategy for project stages with weights in 0..=100.
fn arb_stages() -> impl Strategy<Value = Vec<Stage>> {
    prop::collection::vec((0u32..=100, any::<bool>()), 0..8).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (weight, is_done))| Stage {
                id: StageId::from_u128(i as u128),
                title: format!("stage {i}"),
                weight,
                is_done,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// start == target: 100 iff current >= target, else 0.
    #[test]
    fn prop_degenerate_range_is_threshold(target in arb_value(), current in arb_value()) {
        let progress = MeasureEngine::range_progress(&ValueRange::new(target, target, current));
        prop_assert_eq!(progress, if current >= target { 100 } else { 0 });
    }

    /// Progress stays within 0..=100 for any non-degenerate range.
    #[test]
    fn prop_range_progress_is_clamped(
        start in arb_value(),
        target in arb_value(),
        current in arb_value(),
    ) {
        prop_assume!(start != target);
        let progress = MeasureEngine::range_progress(&ValueRange::new(start, target, current));
        prop_assert!(progress <= 100);
    }

    /// Moving current toward the target never lowers progress.
    #[test]
    fn prop_range_progress_is_monotonic(
        start in arb_value(),
        target in arb_value(),
        a in arb_value(),
        b in arb_value(),
    ) {
        prop_assume!(start != target);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let p_low = MeasureEngine::range_progress(&ValueRange::new(start, target, low));
        let p_high = MeasureEngine::range_progress(&ValueRange::new(start, target, high));
        if target > start {
            prop_assert!(p_low <= p_high);
        } else {
            prop_assert!(p_low >= p_high);
        }
    }

    /// Project progress is exactly the sum of done stage weights, unclamped.
    #[test]
    fn prop_project_progress_is_done_weight_sum(stages in arb_stages()) {
        let expected: u32 = stages.iter().filter(|s| s.is_done).map(|s| s.weight).sum();
        prop_assert_eq!(MeasureEngine::project_progress(&stages), expected);
    }

    /// Checkpoint progress is total and bounded over the whole decimal range.
    #[test]
    fn prop_checkpoint_progress_is_total(
        start in arb_full_value(),
        target in arb_full_value(),
        current in arb_full_value(),
        checkpoints in prop::collection::vec((arb_full_value(), 0u32..=120), 0..4),
    ) {
        let checkpoints: Vec<Checkpoint> = checkpoints
            .into_iter()
            .map(|(value, percent)| Checkpoint { value, percent })
            .collect();
        let progress = MeasureEngine::checkpoint_progress(
            &ValueRange::new(start, target, current),
            &checkpoints,
        );
        prop_assert!(progress <= 100);
    }
}
