//! Persistence boundary of the engine.

use async_trait::async_trait;
use okrs_shared::{GoalId, KeyResultId, TeamId};

use crate::error::OkrResult;
use crate::goal::Goal;
use crate::hierarchy::Team;
use crate::quarter::{QuarterGoal, QuarterStatus, TeamQuarter};
use crate::sharing::ShareLink;

/// Writes produced by one mutation, applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Goals to insert or replace, key results and comments included.
    pub goals: Vec<Goal>,
    /// Goals to delete together with their links.
    pub deleted_goals: Vec<GoalId>,
    /// Links to insert or replace, keyed by `(goal_id, team_id)`.
    pub links: Vec<ShareLink>,
    /// Complete replacement link sets, per goal.
    pub replaced_links: Vec<(GoalId, Vec<ShareLink>)>,
    /// Quarter statuses to store.
    pub statuses: Vec<(TeamQuarter, QuarterStatus)>,
}

impl ChangeSet {
    /// Inserts or replaces a goal.
    #[must_use]
    pub fn upsert_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    /// Deletes a goal and its links.
    #[must_use]
    pub fn delete_goal(mut self, goal_id: GoalId) -> Self {
        self.deleted_goals.push(goal_id);
        self
    }

    /// Inserts or replaces single links, leaving the goal's other links
    /// alone.
    #[must_use]
    pub fn upsert_links(mut self, links: impl IntoIterator<Item = ShareLink>) -> Self {
        self.links.extend(links);
        self
    }

    /// Replaces a goal's whole link set.
    #[must_use]
    pub fn replace_links(mut self, goal_id: GoalId, links: Vec<ShareLink>) -> Self {
        self.replaced_links.push((goal_id, links));
        self
    }

    /// Stores a quarter status, if any.
    #[must_use]
    pub fn set_status(mut self, key: TeamQuarter, status: Option<QuarterStatus>) -> Self {
        if let Some(status) = status {
            self.statuses.push((key, status));
        }
        self
    }

    /// True when applying would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
            && self.deleted_goals.is_empty()
            && self.links.is_empty()
            && self.replaced_links.is_empty()
            && self.statuses.is_empty()
    }
}

/// Storage collaborator. Reads return last-committed state.
#[async_trait]
pub trait OkrRepository: Send + Sync {
    /// Every team in the organization.
    async fn list_teams(&self) -> OkrResult<Vec<Team>>;

    /// One team.
    async fn get_team(&self, team_id: TeamId) -> OkrResult<Option<Team>>;

    /// A goal with its key results and comments.
    async fn get_goal(&self, goal_id: GoalId) -> OkrResult<Option<Goal>>;

    /// The goal owning a key result.
    async fn find_goal_by_key_result(&self, kr_id: KeyResultId) -> OkrResult<Option<Goal>>;

    /// Every link of a goal, the origin's included.
    async fn list_share_links(&self, goal_id: GoalId) -> OkrResult<Vec<ShareLink>>;

    /// Goals linked into a team-quarter, each with this team's link and
    /// the goal's full link set.
    async fn list_quarter_goals(&self, key: TeamQuarter) -> OkrResult<Vec<QuarterGoal>>;

    /// The stored status, `None` if never stored.
    async fn get_quarter_status(&self, key: TeamQuarter) -> OkrResult<Option<QuarterStatus>>;

    /// Applies a change set atomically.
    async fn apply(&self, changes: ChangeSet) -> OkrResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quarter::Quarter;

    #[test]
    fn test_change_set_builder() {
        let key = TeamQuarter::new(TeamId::from_u128(1), Quarter::new(2026, 1).unwrap());
        assert!(ChangeSet::default().set_status(key, None).is_empty());
        let changes = ChangeSet::default()
            .delete_goal(GoalId::from_u128(2))
            .set_status(key, Some(QuarterStatus::NoGoals));
        assert!(!changes.is_empty());
        assert_eq!(changes.statuses, vec![(key, QuarterStatus::NoGoals)]);
    }
}
