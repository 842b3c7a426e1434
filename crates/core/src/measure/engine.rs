//! Progress computation for key result measures.
//!
//! All functions are pure and total: degenerate ranges, overflowing
//! values and unconfigured measures produce a percent, never an error.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::types::{Checkpoint, Measure, Stage, ValueRange};

/// Whether a key result has a metric to measure against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    /// Progress was computed from the configured measure.
    Measured,
    /// No metric configured; progress is reported as 0.
    NotConfigured,
}

/// Progress of a single key result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureProgress {
    /// Progress percent.
    pub percent: u32,
    /// Whether the percent came from a configured measure.
    pub status: MeasureStatus,
}

/// Stateless progress calculator.
pub struct MeasureEngine;

impl MeasureEngine {
    /// Evaluates an optional measure, reporting unconfigured key results as
    /// 0% with `NotConfigured` status.
    #[must_use]
    pub fn evaluate(measure: Option<&Measure>) -> MeasureProgress {
        match measure {
            Some(measure) => MeasureProgress {
                percent: Self::progress(measure),
                status: MeasureStatus::Measured,
            },
            None => MeasureProgress {
                percent: 0,
                status: MeasureStatus::NotConfigured,
            },
        }
    }

    /// Progress percent of a configured measure.
    ///
    /// Percent and linear measures are clamped to `0..=100`; project
    /// measures are the raw sum of done stage weights and may exceed 100.
    #[must_use]
    pub fn progress(measure: &Measure) -> u32 {
        match measure {
            Measure::Percent(percent) => {
                Self::checkpoint_progress(&percent.range(), &percent.checkpoints)
            }
            Measure::Linear(range) => Self::range_progress(range),
            Measure::Boolean(boolean) => Self::boolean_progress(boolean.is_done),
            Measure::Project(project) => Self::project_progress(&project.stages),
        }
    }

    /// `clamp((current - start) / (target - start) * 100, 0, 100)`.
    ///
    /// When `start == target` the range is a threshold: 100 once `current`
    /// reaches the target, 0 before.
    #[must_use]
    pub fn range_progress(range: &ValueRange) -> u32 {
        let ValueRange {
            start_value: start,
            target_value: target,
            current_value: current,
        } = *range;

        if start == target {
            return if current >= target { 100 } else { 0 };
        }

        let ratio = current
            .checked_sub(start)
            .zip(target.checked_sub(start))
            .and_then(|(done, span)| done.checked_div(span))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

        match ratio {
            Some(raw) => clamp_percent(raw),
            None => Self::overflow_progress(range),
        }
    }

    /// Piecewise-linear progress through start (0%), checkpoints and target
    /// (100%), ordered along the start → target direction.
    ///
    /// Without checkpoints this is exactly [`Self::range_progress`].
    #[must_use]
    pub fn checkpoint_progress(range: &ValueRange, checkpoints: &[Checkpoint]) -> u32 {
        if checkpoints.is_empty() || range.start_value == range.target_value {
            return Self::range_progress(range);
        }

        let descending = range.target_value < range.start_value;
        // Flip the axis for decreasing measures so the curve always ascends.
        let orient = |value: Decimal| if descending { -value } else { value };

        let mut points: Vec<(Decimal, Decimal)> = Vec::with_capacity(checkpoints.len() + 2);
        points.push((orient(range.start_value), Decimal::ZERO));
        points.extend(
            checkpoints
                .iter()
                .map(|cp| (orient(cp.value), Decimal::from(cp.percent.min(100)))),
        );
        points.push((orient(range.target_value), Decimal::ONE_HUNDRED));
        points.sort_by(|a, b| a.0.cmp(&b.0));

        let current = orient(range.current_value);
        let (first, last) = (points[0], points[points.len() - 1]);
        if current <= first.0 {
            return 0;
        }
        if current >= last.0 {
            return 100;
        }

        for pair in points.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if current >= left.0 && current <= right.0 {
                return clamp_percent(interpolate(left, right, current));
            }
        }
        0
    }

    /// 100 when done, 0 otherwise.
    #[must_use]
    pub const fn boolean_progress(is_done: bool) -> u32 {
        if is_done { 100 } else { 0 }
    }

    /// Sum of the weights of done stages, deliberately unclamped.
    #[must_use]
    pub fn project_progress(stages: &[Stage]) -> u32 {
        stages
            .iter()
            .filter(|stage| stage.is_done)
            .fold(0u32, |total, stage| total.saturating_add(stage.weight))
    }

    /// Fallback for values too large for exact decimal arithmetic.
    fn overflow_progress(range: &ValueRange) -> u32 {
        let reached = if range.target_value > range.start_value {
            range.current_value >= range.target_value
        } else {
            range.current_value <= range.target_value
        };
        if reached { 100 } else { 0 }
    }
}

/// Linear interpolation inside one segment. Falls back to the segment's
/// lower percent when the values are too large for exact arithmetic.
fn interpolate(left: (Decimal, Decimal), right: (Decimal, Decimal), current: Decimal) -> Decimal {
    if right.0 == left.0 {
        return left.1;
    }
    current
        .checked_sub(left.0)
        .zip(right.0.checked_sub(left.0))
        .and_then(|(done, span)| done.checked_div(span))
        .and_then(|position| position.checked_mul(right.1 - left.1))
        .and_then(|delta| left.1.checked_add(delta))
        .unwrap_or(if current >= right.0 { right.1 } else { left.1 })
}

/// Clamps to `0..=100` and rounds halves away from zero.
fn clamp_percent(value: Decimal) -> u32 {
    let clamped = value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    clamped
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::types::{BooleanMeasure, PercentMeasure, ProjectMeasure};
    use okrs_shared::StageId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn range(start: Decimal, target: Decimal, current: Decimal) -> ValueRange {
        ValueRange::new(start, target, current)
    }

    fn stage(weight: u32, is_done: bool) -> Stage {
        Stage {
            id: StageId::new(),
            title: format!("stage {weight}"),
            weight,
            is_done,
        }
    }

    #[rstest]
    #[case(dec!(0), dec!(50), dec!(25), 50)]
    #[case(dec!(0), dec!(100), dec!(150), 100)]
    #[case(dec!(0), dec!(100), dec!(-5), 0)]
    #[case(dec!(1000), dec!(1500), dec!(1200), 40)]
    #[case(dec!(10), dec!(0), dec!(4), 60)]
    #[case(dec!(10), dec!(0), dec!(12), 0)]
    #[case(dec!(0), dec!(3), dec!(1), 33)]
    #[case(dec!(0), dec!(8), dec!(1), 13)]
    #[case(dec!(0), dec!(200), dec!(1), 1)]
    fn test_range_progress(
        #[case] start: Decimal,
        #[case] target: Decimal,
        #[case] current: Decimal,
        #[case] expected: u32,
    ) {
        assert_eq!(
            MeasureEngine::range_progress(&range(start, target, current)),
            expected
        );
    }

    #[rstest]
    #[case(dec!(5), 100)]
    #[case(dec!(6), 100)]
    #[case(dec!(4.99), 0)]
    fn test_degenerate_range_is_threshold(#[case] current: Decimal, #[case] expected: u32) {
        assert_eq!(
            MeasureEngine::range_progress(&range(dec!(5), dec!(5), current)),
            expected
        );
    }

    #[test]
    fn test_range_progress_survives_overflow() {
        let huge = range(Decimal::MIN, Decimal::MAX, Decimal::MAX);
        assert_eq!(MeasureEngine::range_progress(&huge), 100);
        let behind = range(Decimal::MIN, Decimal::MAX, Decimal::MIN);
        assert_eq!(MeasureEngine::range_progress(&behind), 0);
    }

    #[test]
    fn test_checkpoints_bend_the_curve() {
        let checkpoints = vec![Checkpoint {
            value: dec!(50),
            percent: 80,
        }];
        let r = |current| range(dec!(0), dec!(100), current);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(25)), &checkpoints), 40);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(50)), &checkpoints), 80);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(75)), &checkpoints), 90);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(120)), &checkpoints), 100);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(-1)), &checkpoints), 0);
    }

    #[test]
    fn test_checkpoints_on_decreasing_measure() {
        let checkpoints = vec![Checkpoint {
            value: dec!(50),
            percent: 20,
        }];
        let r = |current| range(dec!(100), dec!(0), current);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(75)), &checkpoints), 10);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(25)), &checkpoints), 60);
        assert_eq!(MeasureEngine::checkpoint_progress(&r(dec!(0)), &checkpoints), 100);
    }

    #[test]
    fn test_checkpoints_near_decimal_limits_do_not_overflow() {
        let big = |tenths: i128| Decimal::from_i128_with_scale(tenths * 10i128.pow(27), 0);
        let checkpoints = vec![Checkpoint {
            value: big(70),
            percent: 50,
        }];
        let r = |current| range(Decimal::MIN, Decimal::MAX, current);
        let low = r(big(10));
        assert_eq!(MeasureEngine::checkpoint_progress(&low, &checkpoints), 0);
        let high = r(big(75));
        let progress = MeasureEngine::checkpoint_progress(&high, &checkpoints);
        assert!((50..=100).contains(&progress));
    }

    #[test]
    fn test_boolean_progress() {
        assert_eq!(MeasureEngine::boolean_progress(true), 100);
        assert_eq!(MeasureEngine::boolean_progress(false), 0);
    }

    #[test]
    fn test_project_progress_sums_done_weights() {
        let stages = vec![stage(40, true), stage(60, false)];
        assert_eq!(MeasureEngine::project_progress(&stages), 40);
    }

    #[test]
    fn test_project_progress_is_not_clamped() {
        let stages = vec![stage(70, true), stage(60, true)];
        assert_eq!(MeasureEngine::project_progress(&stages), 130);
    }

    #[test]
    fn test_progress_dispatches_on_kind() {
        let percent = Measure::Percent(PercentMeasure {
            start_value: dec!(0),
            target_value: dec!(50),
            current_value: dec!(25),
            checkpoints: Vec::new(),
        });
        assert_eq!(MeasureEngine::progress(&percent), 50);
        let boolean = Measure::Boolean(BooleanMeasure { is_done: true });
        assert_eq!(MeasureEngine::progress(&boolean), 100);
        let project = Measure::Project(ProjectMeasure::default());
        assert_eq!(MeasureEngine::progress(&project), 0);
    }

    #[test]
    fn test_missing_measure_reports_not_configured() {
        let progress = MeasureEngine::evaluate(None);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.status, MeasureStatus::NotConfigured);

        let measured = MeasureEngine::evaluate(Some(&Measure::Boolean(BooleanMeasure {
            is_done: true,
        })));
        assert_eq!(measured.status, MeasureStatus::Measured);
    }
}
