//! Operations on a single key result.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::comment::{self, Comment};
use crate::error::{OkrError, OkrResult, wrong_kind};
use crate::key_result::types::{KeyResult, KeyResultInput, StageUpdate};
use crate::measure::{Measure, MeasureEngine, MeasureProgress};
use crate::quarter::{EditKind, QuarterScope};
use crate::weight::validate_weight;

/// Stateless operations on a key result.
///
/// Every mutation takes the [`QuarterScope`] of the goal's origin
/// team-quarter and asks it to authorize the edit first.
pub struct KeyResultAggregator;

impl KeyResultAggregator {
    /// Progress of the key result.
    #[must_use]
    pub fn progress(kr: &KeyResult) -> MeasureProgress {
        MeasureEngine::evaluate(kr.measure.as_ref())
    }

    /// Records the current value of a percent or linear measure.
    ///
    /// # Errors
    /// `InvalidMeasureKind` unless the key result is PERCENT or LINEAR.
    pub fn set_percent_progress(
        scope: &QuarterScope,
        kr: &mut KeyResult,
        current: Decimal,
    ) -> OkrResult<()> {
        scope.authorize(EditKind::UpdateProgress)?;
        match kr.measure.as_mut() {
            Some(Measure::Percent(percent)) => percent.current_value = current,
            Some(Measure::Linear(range)) => range.current_value = current,
            other => {
                return Err(wrong_kind(
                    kr.id,
                    "PERCENT or LINEAR",
                    other.map(|m| m.kind()),
                ));
            }
        }
        kr.updated_at = Utc::now();
        Ok(())
    }

    /// Marks a boolean key result done or not done.
    ///
    /// # Errors
    /// `InvalidMeasureKind` unless the key result is BOOLEAN.
    pub fn set_boolean_progress(
        scope: &QuarterScope,
        kr: &mut KeyResult,
        is_done: bool,
    ) -> OkrResult<()> {
        scope.authorize(EditKind::UpdateProgress)?;
        match kr.measure.as_mut() {
            Some(Measure::Boolean(boolean)) => boolean.is_done = is_done,
            other => return Err(wrong_kind(kr.id, "BOOLEAN", other.map(|m| m.kind()))),
        }
        kr.updated_at = Utc::now();
        Ok(())
    }

    /// Sets completion flags on project stages. Unknown stage IDs are
    /// ignored.
    ///
    /// # Errors
    /// `InvalidMeasureKind` unless the key result is PROJECT.
    pub fn set_project_progress(
        scope: &QuarterScope,
        kr: &mut KeyResult,
        updates: &[StageUpdate],
    ) -> OkrResult<()> {
        scope.authorize(EditKind::UpdateProgress)?;
        let project = match kr.measure.as_mut() {
            Some(Measure::Project(project)) => project,
            other => return Err(wrong_kind(kr.id, "PROJECT", other.map(|m| m.kind()))),
        };
        for update in updates {
            if let Some(stage) = project.stages.iter_mut().find(|s| s.id == update.stage_id) {
                stage.is_done = update.is_done;
            }
        }
        kr.updated_at = Utc::now();
        Ok(())
    }

    /// Appends a comment. Allowed in every quarter status.
    pub fn add_comment(scope: &QuarterScope, kr: &mut KeyResult, text: &str) -> OkrResult<Comment> {
        scope.authorize(EditKind::AddComment)?;
        comment::append(&mut kr.comments, text)
    }

    /// Replaces title, description, weight and (optionally) the measure.
    ///
    /// # Errors
    /// `QuarterLocked` when the quarter is locked, `Validation` for an
    /// out-of-range weight, blank title or invalid measure seed.
    pub fn update(scope: &QuarterScope, kr: &mut KeyResult, input: KeyResultInput) -> OkrResult<()> {
        scope.authorize(EditKind::UpdateKeyResult)?;
        let title = validate_input(&input)?;
        kr.title = title;
        kr.description = input.description.trim().to_string();
        kr.weight = input.weight;
        if let Some(seed) = input.measure {
            kr.measure = Some(seed.into_measure());
        }
        kr.updated_at = Utc::now();
        Ok(())
    }
}

/// Checks a key result input and returns its trimmed title.
pub(crate) fn validate_input(input: &KeyResultInput) -> OkrResult<String> {
    validate_weight("key result", input.weight)?;
    let title = input.title.trim();
    if title.is_empty() {
        return Err(OkrError::Validation("key result title is required".into()));
    }
    if let Some(seed) = &input.measure {
        seed.validate()?;
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{
        BooleanMeasure, MeasureKind, MeasureSeed, MeasureStatus, ProjectMeasure, Stage, StageSeed,
        ValueRange,
    };
    use crate::quarter::{Quarter, QuarterStatus, TeamQuarter};
    use okrs_shared::{GoalId, KeyResultId, StageId, TeamId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn scope(status: QuarterStatus) -> QuarterScope {
        QuarterScope::new(
            TeamQuarter::new(TeamId::from_u128(1), Quarter::new(2026, 2).unwrap()),
            status,
        )
    }

    fn kr(measure: Option<Measure>) -> KeyResult {
        let now = Utc::now();
        KeyResult {
            id: KeyResultId::from_u128(10),
            goal_id: GoalId::from_u128(20),
            title: "Cut p95 latency".into(),
            description: String::new(),
            weight: 50,
            order_index: 0,
            measure,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn project() -> Measure {
        Measure::Project(ProjectMeasure {
            stages: vec![
                Stage {
                    id: StageId::from_u128(1),
                    title: "Audit".into(),
                    weight: 40,
                    is_done: false,
                },
                Stage {
                    id: StageId::from_u128(2),
                    title: "Remediations".into(),
                    weight: 60,
                    is_done: false,
                },
            ],
        })
    }

    #[rstest]
    #[case(QuarterStatus::Forming)]
    #[case(QuarterStatus::Validated)]
    #[case(QuarterStatus::Closed)]
    fn test_linear_progress_updates_in_every_status(#[case] status: QuarterStatus) {
        let mut kr = kr(Some(Measure::Linear(ValueRange::new(dec!(10), dec!(0), dec!(10)))));
        KeyResultAggregator::set_percent_progress(&scope(status), &mut kr, dec!(4)).unwrap();
        assert_eq!(KeyResultAggregator::progress(&kr).percent, 60);
    }

    #[test]
    fn test_percent_progress_rejects_boolean() {
        let mut kr = kr(Some(Measure::Boolean(BooleanMeasure::default())));
        let err = KeyResultAggregator::set_percent_progress(
            &scope(QuarterStatus::Forming),
            &mut kr,
            dec!(1),
        )
        .unwrap_err();
        assert!(matches!(err, OkrError::InvalidMeasureKind { actual, .. } if actual == "BOOLEAN"));
    }

    #[test]
    fn test_boolean_progress_rejects_unconfigured() {
        let mut kr = kr(None);
        let err =
            KeyResultAggregator::set_boolean_progress(&scope(QuarterStatus::Forming), &mut kr, true)
                .unwrap_err();
        assert!(matches!(err, OkrError::InvalidMeasureKind { actual, .. } if actual == "none"));
        assert_eq!(
            KeyResultAggregator::progress(&kr).status,
            MeasureStatus::NotConfigured
        );
    }

    #[test]
    fn test_project_progress_ignores_unknown_stages() {
        let mut kr = kr(Some(project()));
        KeyResultAggregator::set_project_progress(
            &scope(QuarterStatus::Closed),
            &mut kr,
            &[
                StageUpdate {
                    stage_id: StageId::from_u128(1),
                    is_done: true,
                },
                StageUpdate {
                    stage_id: StageId::from_u128(99),
                    is_done: true,
                },
            ],
        )
        .unwrap();
        assert_eq!(KeyResultAggregator::progress(&kr).percent, 40);
    }

    #[test]
    fn test_comment_allowed_when_closed() {
        let mut kr = kr(None);
        let comment =
            KeyResultAggregator::add_comment(&scope(QuarterStatus::Closed), &mut kr, "blocked on vendor")
                .unwrap();
        assert_eq!(kr.latest_comment(), Some(&comment));
    }

    #[test]
    fn test_update_rejected_when_validated() {
        let mut kr = kr(None);
        let input = KeyResultInput {
            title: "New".into(),
            description: String::new(),
            weight: 30,
            measure: None,
        };
        let err = KeyResultAggregator::update(&scope(QuarterStatus::Validated), &mut kr, input)
            .unwrap_err();
        assert!(matches!(
            err,
            OkrError::QuarterLocked {
                operation: EditKind::UpdateKeyResult,
                ..
            }
        ));
        assert_eq!(kr.weight, 50);
    }

    #[test]
    fn test_update_changes_measure_kind() {
        let mut kr = kr(Some(project()));
        let input = KeyResultInput {
            title: "  Launch  ".into(),
            description: "go live".into(),
            weight: 25,
            measure: Some(MeasureSeed::Boolean(BooleanMeasure { is_done: true })),
        };
        KeyResultAggregator::update(&scope(QuarterStatus::InProgress), &mut kr, input).unwrap();
        assert_eq!(kr.title, "Launch");
        assert_eq!(kr.weight, 25);
        assert_eq!(kr.measure.as_ref().map(Measure::kind), Some(MeasureKind::Boolean));
        assert_eq!(KeyResultAggregator::progress(&kr).percent, 100);
    }

    #[test]
    fn test_update_keeps_measure_when_not_supplied() {
        let mut kr = kr(Some(project()));
        let input = KeyResultInput {
            title: "Same".into(),
            description: String::new(),
            weight: 10,
            measure: None,
        };
        KeyResultAggregator::update(&scope(QuarterStatus::Forming), &mut kr, input).unwrap();
        assert_eq!(kr.measure, Some(project()));
    }

    #[rstest]
    #[case(101, "Valid", "weight")]
    #[case(10, "   ", "title")]
    fn test_update_validates_input(#[case] weight: u32, #[case] title: &str, #[case] needle: &str) {
        let mut kr = kr(None);
        let input = KeyResultInput {
            title: title.into(),
            description: String::new(),
            weight,
            measure: None,
        };
        let err =
            KeyResultAggregator::update(&scope(QuarterStatus::Forming), &mut kr, input).unwrap_err();
        assert!(matches!(err, OkrError::Validation(msg) if msg.contains(needle)));
    }

    #[test]
    fn test_update_validates_stage_weights() {
        let mut kr = kr(None);
        let input = KeyResultInput {
            title: "Ship".into(),
            description: String::new(),
            weight: 10,
            measure: Some(MeasureSeed::Project {
                stages: vec![StageSeed {
                    id: None,
                    title: "Build".into(),
                    weight: 150,
                    is_done: false,
                }],
            }),
        };
        assert!(KeyResultAggregator::update(&scope(QuarterStatus::Forming), &mut kr, input).is_err());
    }
}
