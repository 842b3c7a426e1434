//! Operations on a goal and its key results.

use chrono::Utc;
use okrs_shared::KeyResultId;

use crate::comment::{self, Comment};
use crate::error::{Entity, OkrError, OkrResult};
use crate::goal::types::{Goal, GoalInput};
use crate::key_result::aggregator::validate_input;
use crate::key_result::{KeyResult, KeyResultAggregator, KeyResultInput};
use crate::measure::Measure;
use crate::ordering::{MoveDirection, next_order_index, swap_with_neighbor};
use crate::quarter::{EditKind, QuarterScope};
use crate::validation::{ValidationWarning, is_off_weight};
use crate::weight::{validate_weight, weighted_rollup};

/// Stateless operations on a goal.
///
/// The scope passed to each mutation is the goal's origin team-quarter.
pub struct GoalAggregator;

impl GoalAggregator {
    /// `round(Σ kr.weight * kr.progress / 100)`, not normalized.
    #[must_use]
    pub fn progress(goal: &Goal) -> u32 {
        weighted_rollup(
            goal.key_results
                .iter()
                .map(|kr| (kr.weight, KeyResultAggregator::progress(kr).percent)),
        )
    }

    /// Sum of key result weights.
    #[must_use]
    pub fn key_result_weight_sum(goal: &Goal) -> u32 {
        goal.key_results.iter().map(|kr| kr.weight).sum()
    }

    /// Weight-sum warnings for the goal and its project key results.
    #[must_use]
    pub fn warnings(goal: &Goal) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let sum = Self::key_result_weight_sum(goal);
        if is_off_weight(sum, goal.key_results.len()) {
            warnings.push(ValidationWarning::KeyResultWeightSum {
                goal_id: goal.id,
                sum,
            });
        }
        for kr in &goal.key_results {
            if let Some(Measure::Project(project)) = &kr.measure {
                let sum = project.weight_sum();
                if is_off_weight(sum, project.stages.len()) {
                    warnings.push(ValidationWarning::StageWeightSum {
                        key_result_id: kr.id,
                        sum,
                    });
                }
            }
        }
        warnings
    }

    /// Replaces the goal's editable fields.
    pub fn update_goal(scope: &QuarterScope, goal: &mut Goal, input: GoalInput) -> OkrResult<()> {
        scope.authorize(EditKind::UpdateGoal)?;
        let title = validate_goal_input(&input)?;
        goal.title = title;
        goal.description = input.description.trim().to_string();
        goal.priority = input.priority;
        goal.weight = input.weight;
        goal.work_type = input.work_type;
        goal.focus_type = input.focus_type;
        goal.owner_text = input.owner_text.trim().to_string();
        goal.updated_at = Utc::now();
        Ok(())
    }

    /// Appends a comment to the goal's own log.
    pub fn add_comment(scope: &QuarterScope, goal: &mut Goal, text: &str) -> OkrResult<Comment> {
        scope.authorize(EditKind::AddComment)?;
        comment::append(&mut goal.comments, text)
    }

    /// Adds a key result after the last one and returns its ID.
    pub fn add_key_result(
        scope: &QuarterScope,
        goal: &mut Goal,
        input: KeyResultInput,
    ) -> OkrResult<KeyResultId> {
        scope.authorize(EditKind::CreateKeyResult)?;
        let title = validate_input(&input)?;
        let now = Utc::now();
        let kr = KeyResult {
            id: KeyResultId::new(),
            goal_id: goal.id,
            title,
            description: input.description.trim().to_string(),
            weight: input.weight,
            order_index: next_order_index(goal.key_results.iter().map(|kr| kr.order_index)),
            measure: input.measure.map(|seed| seed.into_measure()),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = kr.id;
        goal.key_results.push(kr);
        goal.updated_at = now;
        Ok(id)
    }

    /// Edits one key result.
    pub fn update_key_result(
        scope: &QuarterScope,
        goal: &mut Goal,
        kr_id: KeyResultId,
        input: KeyResultInput,
    ) -> OkrResult<()> {
        let kr = Self::key_result_mut(goal, kr_id)?;
        KeyResultAggregator::update(scope, kr, input)?;
        goal.updated_at = Utc::now();
        Ok(())
    }

    /// Removes a key result. Remaining order indexes are left as they are.
    pub fn delete_key_result(
        scope: &QuarterScope,
        goal: &mut Goal,
        kr_id: KeyResultId,
    ) -> OkrResult<()> {
        scope.authorize(EditKind::DeleteKeyResult)?;
        let position = goal
            .key_results
            .iter()
            .position(|kr| kr.id == kr_id)
            .ok_or_else(|| OkrError::not_found(Entity::KeyResult, kr_id))?;
        goal.key_results.remove(position);
        goal.updated_at = Utc::now();
        Ok(())
    }

    /// Swaps a key result with its neighbour. Returns false at a boundary,
    /// where nothing changes.
    pub fn move_key_result(
        scope: &QuarterScope,
        goal: &mut Goal,
        kr_id: KeyResultId,
        direction: MoveDirection,
    ) -> OkrResult<bool> {
        scope.authorize(EditKind::Reorder)?;
        goal.key_results.sort_by_key(|kr| kr.order_index);
        let position = goal
            .key_results
            .iter()
            .position(|kr| kr.id == kr_id)
            .ok_or_else(|| OkrError::not_found(Entity::KeyResult, kr_id))?;
        let moved =
            swap_with_neighbor(&mut goal.key_results, position, direction, |kr| &mut kr.order_index)
                .is_some();
        if moved {
            goal.key_results.sort_by_key(|kr| kr.order_index);
            goal.updated_at = Utc::now();
        }
        Ok(moved)
    }

    /// Mutable access to one key result.
    pub fn key_result_mut(goal: &mut Goal, kr_id: KeyResultId) -> OkrResult<&mut KeyResult> {
        goal.key_results
            .iter_mut()
            .find(|kr| kr.id == kr_id)
            .ok_or_else(|| OkrError::not_found(Entity::KeyResult, kr_id))
    }
}

/// Checks goal input and returns its trimmed title.
pub(crate) fn validate_goal_input(input: &GoalInput) -> OkrResult<String> {
    validate_weight("goal", input.weight)?;
    let title = input.title.trim();
    if title.is_empty() {
        return Err(OkrError::Validation("goal title is required".into()));
    }
    Ok(title.to_string())
}
