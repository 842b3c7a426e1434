//! A team's goals for one quarter: progress rollup, ordering and status.

use chrono::Utc;
use okrs_shared::GoalId;

use crate::error::{Entity, OkrError, OkrResult};
use crate::goal::aggregator::validate_goal_input;
use crate::goal::{Goal, GoalAggregator, GoalInput};
use crate::ordering::{MoveDirection, next_order_index, swap_with_neighbor};
use crate::quarter::types::{EditKind, QuarterScope, QuarterStatus, TeamQuarter};
use crate::sharing::{ShareLink, SharingResolver};
use crate::validation::{ValidationWarning, is_off_weight};
use crate::weight::weighted_rollup;

/// A goal as it appears in one team's quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterGoal {
    /// This team's link: its weight and position for the goal.
    pub link: ShareLink,
    /// The goal itself.
    pub goal: Goal,
    /// Every link of the goal, this team's included.
    pub shares: Vec<ShareLink>,
}

impl QuarterGoal {
    /// True when the goal originates in this team.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        self.goal.team_id == self.link.team_id
    }

    /// Writes this team's link back into the full link set, and into the
    /// goal itself when this team is the origin.
    fn store_link(&mut self) {
        if let Some(slot) = self
            .shares
            .iter_mut()
            .find(|link| link.team_id == self.link.team_id)
        {
            *slot = self.link;
        } else {
            self.shares.push(self.link);
        }
        if self.is_origin() {
            self.goal.weight = self.link.weight;
            self.goal.order_index = self.link.order_index;
            self.goal.updated_at = Utc::now();
        }
    }
}

/// Loaded state of a team-quarter.
#[derive(Debug, Clone)]
pub struct TeamQuarterAggregator {
    key: TeamQuarter,
    stored_status: Option<QuarterStatus>,
    goals: Vec<QuarterGoal>,
}

impl TeamQuarterAggregator {
    /// Builds the aggregate, ordering goals by this team's link order.
    #[must_use]
    pub fn new(
        key: TeamQuarter,
        stored_status: Option<QuarterStatus>,
        mut goals: Vec<QuarterGoal>,
    ) -> Self {
        goals.sort_by_key(|g| (g.link.order_index, g.goal.created_at));
        Self {
            key,
            stored_status,
            goals,
        }
    }

    /// The team-quarter this aggregate covers.
    #[must_use]
    pub const fn key(&self) -> TeamQuarter {
        self.key
    }

    /// Goals in display order.
    #[must_use]
    pub fn goals(&self) -> &[QuarterGoal] {
        &self.goals
    }

    /// Looks up a goal.
    #[must_use]
    pub fn goal(&self, goal_id: GoalId) -> Option<&QuarterGoal> {
        self.goals.iter().find(|g| g.goal.id == goal_id)
    }

    /// Effective status.
    #[must_use]
    pub const fn status(&self) -> QuarterStatus {
        QuarterStatus::effective(self.stored_status, !self.goals.is_empty())
    }

    /// Scope used to authorize edits in this team-quarter.
    #[must_use]
    pub const fn scope(&self) -> QuarterScope {
        QuarterScope::new(self.key, self.status())
    }

    /// `round(Σ link.weight * goal.progress / 100)` over this team's links.
    #[must_use]
    pub fn progress(&self) -> u32 {
        weighted_rollup(
            self.goals
                .iter()
                .map(|g| (g.link.weight, GoalAggregator::progress(&g.goal))),
        )
    }

    /// Sum of this team's goal weights.
    #[must_use]
    pub fn goal_weight_sum(&self) -> u32 {
        self.goals.iter().map(|g| g.link.weight).sum()
    }

    /// True unless goals exist and their weights do not add up to 100.
    #[must_use]
    pub fn goal_weight_ok(&self) -> bool {
        !is_off_weight(self.goal_weight_sum(), self.goals.len())
    }

    /// Weight warnings of the quarter and of every goal in it.
    #[must_use]
    pub fn warnings(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if !self.goal_weight_ok() {
            warnings.push(ValidationWarning::GoalWeightSum {
                team_id: self.key.team_id,
                quarter: self.key.quarter,
                sum: self.goal_weight_sum(),
            });
        }
        for g in &self.goals {
            warnings.extend(GoalAggregator::warnings(&g.goal));
        }
        warnings
    }

    /// Creates a goal originating in this team-quarter, placed last.
    pub fn add_goal(&mut self, input: GoalInput) -> OkrResult<&QuarterGoal> {
        self.scope().authorize(EditKind::CreateGoal)?;
        let title = validate_goal_input(&input)?;
        let now = Utc::now();
        let goal = Goal {
            id: GoalId::new(),
            team_id: self.key.team_id,
            quarter: self.key.quarter,
            title,
            description: input.description.trim().to_string(),
            priority: input.priority,
            weight: input.weight,
            work_type: input.work_type,
            focus_type: input.focus_type,
            owner_text: input.owner_text.trim().to_string(),
            order_index: next_order_index(self.goals.iter().map(|g| g.link.order_index)),
            key_results: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let link = SharingResolver::origin_link(&goal);
        self.goals.push(QuarterGoal {
            link,
            goal,
            shares: vec![link],
        });
        let position = self.goals.len() - 1;
        Ok(&self.goals[position])
    }

    /// Swaps a goal with its neighbour in this team's listing.
    ///
    /// Returns the goals whose link changed; empty at a boundary.
    pub fn move_goal(
        &mut self,
        goal_id: GoalId,
        direction: MoveDirection,
    ) -> OkrResult<Vec<&QuarterGoal>> {
        self.scope().authorize(EditKind::Reorder)?;
        let position = self
            .goals
            .iter()
            .position(|g| g.goal.id == goal_id)
            .ok_or_else(|| OkrError::not_found(Entity::Goal, goal_id))?;
        let Some((a, b)) =
            swap_with_neighbor(&mut self.goals, position, direction, |g| &mut g.link.order_index)
        else {
            return Ok(Vec::new());
        };
        self.goals[a].store_link();
        self.goals[b].store_link();
        let changed = [self.goals[a].goal.id, self.goals[b].goal.id];
        self.goals.sort_by_key(|g| g.link.order_index);
        Ok(self
            .goals
            .iter()
            .filter(|g| changed.contains(&g.goal.id))
            .collect())
    }

    /// Validates an explicit status change.
    ///
    /// Returns the status to store, or `None` when it already holds.
    /// Status changes are allowed in every status, so a locked quarter can
    /// be reopened.
    ///
    /// # Errors
    /// `Validation` when asked to set `no_goals`.
    pub fn resolve_status_change(&self, status: QuarterStatus) -> OkrResult<Option<QuarterStatus>> {
        if !status.is_settable() {
            return Err(OkrError::Validation(format!(
                "status {status} is derived and cannot be set"
            )));
        }
        if self.status() == status && self.stored_status == Some(status) {
            return Ok(None);
        }
        Ok(Some(status))
    }

    /// Status to store after this team-quarter's goal count changed, or
    /// `None` when the stored status is still right. Locked statuses are
    /// only left through an explicit status change.
    #[must_use]
    pub fn settled_status(&self, goal_count: usize) -> Option<QuarterStatus> {
        match (self.stored_status, goal_count) {
            (Some(status), _) if status.is_locked() => None,
            (Some(QuarterStatus::NoGoals), 0) => None,
            (_, 0) => Some(QuarterStatus::NoGoals),
            (None | Some(QuarterStatus::NoGoals), _) => Some(QuarterStatus::Forming),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::aggregator::tests::{empty_goal, goal_input, kr_input};
    use crate::measure::{BooleanMeasure, MeasureSeed};
    use crate::quarter::Quarter;
    use okrs_shared::TeamId;

    fn key(team: u128) -> TeamQuarter {
        TeamQuarter::new(TeamId::from_u128(team), Quarter::new(2026, 1).unwrap())
    }

    fn done_goal(id: u128, weight: u32) -> Goal {
        let mut goal = empty_goal();
        goal.id = GoalId::from_u128(id);
        goal.weight = weight;
        GoalAggregator::add_key_result(
            &QuarterScope::new(key(1), QuarterStatus::Forming),
            &mut goal,
            kr_input(
                "done",
                100,
                Some(MeasureSeed::Boolean(BooleanMeasure { is_done: true })),
            ),
        )
        .unwrap();
        goal
    }

    fn quarter_goal(mut goal: Goal, team: u128, weight: u32, order_index: u32) -> QuarterGoal {
        let link = ShareLink {
            goal_id: goal.id,
            team_id: TeamId::from_u128(team),
            weight,
            order_index,
        };
        if link.team_id == goal.team_id {
            goal.weight = weight;
            goal.order_index = order_index;
        }
        let mut shares = vec![SharingResolver::origin_link(&goal)];
        if link.team_id != goal.team_id {
            shares.push(link);
        }
        QuarterGoal { link, goal, shares }
    }

    #[test]
    fn test_empty_quarter_status() {
        let agg = TeamQuarterAggregator::new(key(1), None, Vec::new());
        assert_eq!(agg.status(), QuarterStatus::NoGoals);
        assert_eq!(agg.progress(), 0);
        assert!(agg.warnings().is_empty());
    }

    #[test]
    fn test_progress_uses_this_teams_weight() {
        let goal = done_goal(1, 40);
        let agg = TeamQuarterAggregator::new(
            key(2),
            Some(QuarterStatus::Forming),
            vec![quarter_goal(goal, 2, 30, 0)],
        );
        assert_eq!(agg.progress(), 30);
        assert_eq!(agg.goal_weight_sum(), 30);
        assert!(!agg.goal_weight_ok());
        assert!(matches!(
            agg.warnings().as_slice(),
            [ValidationWarning::GoalWeightSum { sum: 30, .. }]
        ));
    }

    #[test]
    fn test_add_goal_to_empty_quarter() {
        let mut agg = TeamQuarterAggregator::new(key(1), None, Vec::new());
        let added = agg.add_goal(goal_input("Reduce churn", 100)).unwrap();
        assert_eq!(added.link.weight, 100);
        assert!(added.is_origin());
        assert_eq!(agg.status(), QuarterStatus::Forming);
        assert_eq!(agg.settled_status(agg.goals().len()), Some(QuarterStatus::Forming));
    }

    #[test]
    fn test_add_goal_rejected_when_closed() {
        let mut agg = TeamQuarterAggregator::new(
            key(1),
            Some(QuarterStatus::Closed),
            vec![quarter_goal(done_goal(1, 100), 1, 100, 0)],
        );
        assert!(matches!(
            agg.add_goal(goal_input("late", 0)),
            Err(OkrError::QuarterLocked {
                operation: EditKind::CreateGoal,
                ..
            })
        ));
    }

    #[test]
    fn test_move_goal_swaps_links() {
        let mut agg = TeamQuarterAggregator::new(
            key(1),
            Some(QuarterStatus::Validated),
            vec![
                quarter_goal(done_goal(1, 60), 1, 60, 0),
                quarter_goal(done_goal(2, 40), 1, 40, 1),
            ],
        );
        let changed = agg.move_goal(GoalId::from_u128(2), MoveDirection::Up).unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(agg.goals()[0].goal.id, GoalId::from_u128(2));
        assert_eq!(agg.goals()[0].goal.order_index, 0);
        assert_eq!(agg.goals()[0].shares[0].order_index, 0);

        let changed = agg.move_goal(GoalId::from_u128(2), MoveDirection::Up).unwrap();
        assert!(changed.is_empty());
    }

    #[test]
    fn test_status_changes() {
        let agg = TeamQuarterAggregator::new(
            key(1),
            Some(QuarterStatus::Validated),
            vec![quarter_goal(done_goal(1, 100), 1, 100, 0)],
        );
        assert!(matches!(
            agg.resolve_status_change(QuarterStatus::NoGoals),
            Err(OkrError::Validation(_))
        ));
        assert_eq!(agg.resolve_status_change(QuarterStatus::Validated).unwrap(), None);
        assert_eq!(
            agg.resolve_status_change(QuarterStatus::Forming).unwrap(),
            Some(QuarterStatus::Forming)
        );
    }

    #[test]
    fn test_implicit_status_is_stored_on_first_set() {
        let agg = TeamQuarterAggregator::new(
            key(1),
            None,
            vec![quarter_goal(done_goal(1, 100), 1, 100, 0)],
        );
        assert_eq!(agg.status(), QuarterStatus::Forming);
        assert_eq!(
            agg.resolve_status_change(QuarterStatus::Forming).unwrap(),
            Some(QuarterStatus::Forming)
        );
    }

    #[test]
    fn test_settled_status() {
        let agg = TeamQuarterAggregator::new(key(1), Some(QuarterStatus::InProgress), Vec::new());
        assert_eq!(agg.settled_status(0), Some(QuarterStatus::NoGoals));
        assert_eq!(agg.settled_status(2), None);
        let empty = TeamQuarterAggregator::new(key(1), Some(QuarterStatus::NoGoals), Vec::new());
        assert_eq!(empty.settled_status(0), None);
        assert_eq!(empty.settled_status(1), Some(QuarterStatus::Forming));
        for locked in [QuarterStatus::Validated, QuarterStatus::Closed] {
            let agg = TeamQuarterAggregator::new(key(1), Some(locked), Vec::new());
            assert_eq!(agg.settled_status(0), None);
            assert_eq!(agg.settled_status(1), None);
        }
    }
}
