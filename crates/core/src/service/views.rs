//! Read models returned by queries and mutations.
//!
//! Progress is never stored; every view is derived from committed state
//! at the moment it is built.

use okrs_shared::{GoalId, KeyResultId, TeamId};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::goal::{FocusType, GoalAggregator, Priority, WorkType};
use crate::hierarchy::Team;
use crate::key_result::{KeyResult, KeyResultAggregator};
use crate::measure::{Measure, MeasureStatus};
use crate::quarter::{Quarter, QuarterGoal, QuarterStatus, TeamQuarterAggregator};
use crate::sharing::{ShareLink, SharingResolver};
use crate::validation::{ValidationWarning, is_off_weight};

/// A key result with its derived progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyResultView {
    /// Key result ID.
    pub id: KeyResultId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Weight within the goal.
    pub weight: u32,
    /// Position within the goal.
    pub order_index: u32,
    /// Configured measure.
    pub measure: Option<Measure>,
    /// Progress percent.
    pub progress: u32,
    /// `not_configured` when no measure is set.
    pub measure_status: MeasureStatus,
    /// Stage weight sum of a project measure.
    pub stage_weight_sum: Option<u32>,
    /// Comment log, oldest first.
    pub comments: Vec<Comment>,
}

impl KeyResultView {
    fn build(kr: &KeyResult) -> Self {
        let progress = KeyResultAggregator::progress(kr);
        Self {
            id: kr.id,
            title: kr.title.clone(),
            description: kr.description.clone(),
            weight: kr.weight,
            order_index: kr.order_index,
            measure: kr.measure.clone(),
            progress: progress.percent,
            measure_status: progress.status,
            stage_weight_sum: match &kr.measure {
                Some(Measure::Project(project)) => Some(project.weight_sum()),
                _ => None,
            },
            comments: kr.comments.clone(),
        }
    }
}

/// A goal as seen from one team's quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalView {
    /// Goal ID.
    pub id: GoalId,
    /// Team the goal originates in.
    pub origin_team_id: TeamId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Work type.
    pub work_type: WorkType,
    /// Focus.
    pub focus_type: FocusType,
    /// Owner, free text.
    pub owner_text: String,
    /// The viewing team's weight for the goal.
    pub weight: u32,
    /// The viewing team's position for the goal.
    pub order_index: u32,
    /// Goal progress.
    pub progress: u32,
    /// Whether the goal appears in more than one team.
    pub is_shared: bool,
    /// Every link of the goal.
    pub shares: Vec<ShareLink>,
    /// Sum of key result weights.
    pub key_result_weight_sum: u32,
    /// False when key results exist and do not weigh 100 in total.
    pub key_result_weight_ok: bool,
    /// Key results in order.
    pub key_results: Vec<KeyResultView>,
    /// Goal comment log, oldest first.
    pub comments: Vec<Comment>,
}

impl GoalView {
    /// Builds the view of a goal inside a team-quarter.
    #[must_use]
    pub fn build(entry: &QuarterGoal) -> Self {
        let goal = &entry.goal;
        let mut key_results: Vec<&KeyResult> = goal.key_results.iter().collect();
        key_results.sort_by_key(|kr| kr.order_index);
        let sum = GoalAggregator::key_result_weight_sum(goal);
        Self {
            id: goal.id,
            origin_team_id: goal.team_id,
            title: goal.title.clone(),
            description: goal.description.clone(),
            priority: goal.priority,
            work_type: goal.work_type,
            focus_type: goal.focus_type,
            owner_text: goal.owner_text.clone(),
            weight: entry.link.weight,
            order_index: entry.link.order_index,
            progress: GoalAggregator::progress(goal),
            is_shared: SharingResolver::is_shared(&entry.shares),
            shares: entry.shares.clone(),
            key_result_weight_sum: sum,
            key_result_weight_ok: !is_off_weight(sum, goal.key_results.len()),
            key_results: key_results.into_iter().map(KeyResultView::build).collect(),
            comments: goal.comments.clone(),
        }
    }
}

/// Full OKR view of a team-quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamOkrView {
    /// The team.
    pub team: Team,
    /// The quarter.
    pub quarter: Quarter,
    /// Effective status.
    pub status: QuarterStatus,
    /// Whether structural edits are currently rejected.
    pub locked: bool,
    /// Team-quarter progress.
    pub progress: u32,
    /// Sum of goal weights.
    pub goal_weight_sum: u32,
    /// False when goals exist and do not weigh 100 in total.
    pub goal_weight_ok: bool,
    /// Goals in this team's order.
    pub goals: Vec<GoalView>,
    /// Every weight-sum warning in the quarter.
    pub warnings: Vec<ValidationWarning>,
}

impl TeamOkrView {
    /// Builds the view from a loaded team-quarter.
    #[must_use]
    pub fn build(team: Team, quarter: &TeamQuarterAggregator) -> Self {
        let status = quarter.status();
        Self {
            team,
            quarter: quarter.key().quarter,
            status,
            locked: status.is_locked(),
            progress: quarter.progress(),
            goal_weight_sum: quarter.goal_weight_sum(),
            goal_weight_ok: quarter.goal_weight_ok(),
            goals: quarter.goals().iter().map(GoalView::build).collect(),
            warnings: quarter.warnings(),
        }
    }
}
