//! OKR service: lock, load, apply one aggregator operation, commit, and
//! rebuild the affected view.
//!
//! # Modules
//!
//! - `views` - Read models derived from committed state
//! - `mutations` - Every state-changing operation

mod mutations;
pub mod views;

use okrs_shared::{EngineConfig, GoalId, KeyResultId, TeamId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Entity, OkrError, OkrResult};
use crate::goal::Goal;
use crate::hierarchy::{HierarchyProjector, Team, TeamOption, TeamRow, TeamTree};
use crate::locks::QuarterLocks;
use crate::quarter::{Quarter, QuarterGoal, TeamQuarter, TeamQuarterAggregator};
use crate::repository::OkrRepository;
use crate::sharing::SharingResolver;

pub use views::{GoalView, KeyResultView, TeamOkrView};

/// Entry point for every query and mutation.
pub struct OkrService {
    repo: Arc<dyn OkrRepository>,
    locks: QuarterLocks,
}

impl OkrService {
    /// Creates a service over a repository.
    pub fn new(repo: Arc<dyn OkrRepository>, config: &EngineConfig) -> Self {
        Self {
            repo,
            locks: QuarterLocks::new(config.lock_timeout()),
        }
    }

    /// Team-quarters currently locked or awaited by a mutation.
    #[must_use]
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// The team tree as an indented listing.
    pub async fn hierarchy(&self) -> OkrResult<Vec<TeamOption>> {
        self.team_options(None).await
    }

    /// Team picker entries with `selected` marked.
    pub async fn team_options(&self, selected: Option<TeamId>) -> OkrResult<Vec<TeamOption>> {
        let tree = self.tree().await?;
        Ok(HierarchyProjector::render(&tree, selected).collect())
    }

    /// Every team's quarter summary in hierarchy order, optionally limited
    /// to the subtree of `org`.
    pub async fn teams_for_quarter(
        &self,
        quarter: Quarter,
        org: Option<TeamId>,
    ) -> OkrResult<Vec<TeamRow>> {
        let tree = self.tree().await?;
        let ids: Vec<TeamId> = match org {
            Some(root) => tree.subtree(root)?.map(|(_, team)| team.id).collect(),
            None => tree.walk().map(|(_, team)| team.id).collect(),
        };
        let mut quarters = HashMap::with_capacity(ids.len());
        for id in ids {
            let key = TeamQuarter::new(id, quarter);
            quarters.insert(id, self.load_quarter(key).await?);
        }
        debug!(quarter = %quarter, teams = quarters.len(), "Built quarter dashboard");
        HierarchyProjector::teams_with_progress(&tree, org, &quarters)
    }

    /// Full OKR view of one team-quarter.
    pub async fn team_okr(&self, team_id: TeamId, quarter: Quarter) -> OkrResult<TeamOkrView> {
        self.view(TeamQuarter::new(team_id, quarter)).await
    }

    /// A goal as seen from its origin team.
    pub async fn goal(&self, goal_id: GoalId) -> OkrResult<GoalView> {
        let goal = self.require_goal(goal_id).await?;
        let mut shares = self.repo.list_share_links(goal_id).await?;
        SharingResolver::sync_origin(&goal, &mut shares);
        Ok(GoalView::build(&QuarterGoal {
            link: SharingResolver::origin_link(&goal),
            goal,
            shares,
        }))
    }

    async fn tree(&self) -> OkrResult<TeamTree> {
        TeamTree::build(self.repo.list_teams().await?)
    }

    async fn load_quarter(&self, key: TeamQuarter) -> OkrResult<TeamQuarterAggregator> {
        let stored = self.repo.get_quarter_status(key).await?;
        let goals = self.repo.list_quarter_goals(key).await?;
        Ok(TeamQuarterAggregator::new(key, stored, goals))
    }

    async fn view(&self, key: TeamQuarter) -> OkrResult<TeamOkrView> {
        let team = self.require_team(key.team_id).await?;
        let quarter = self.load_quarter(key).await?;
        Ok(TeamOkrView::build(team, &quarter))
    }

    async fn require_team(&self, team_id: TeamId) -> OkrResult<Team> {
        self.repo
            .get_team(team_id)
            .await?
            .ok_or_else(|| OkrError::not_found(Entity::Team, team_id))
    }

    async fn require_goal(&self, goal_id: GoalId) -> OkrResult<Goal> {
        self.repo
            .get_goal(goal_id)
            .await?
            .ok_or_else(|| OkrError::not_found(Entity::Goal, goal_id))
    }

    async fn require_goal_of(&self, kr_id: KeyResultId) -> OkrResult<Goal> {
        self.repo
            .find_goal_by_key_result(kr_id)
            .await?
            .ok_or_else(|| OkrError::not_found(Entity::KeyResult, kr_id))
    }
}
