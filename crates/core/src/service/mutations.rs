//! State-changing operations.
//!
//! Each mutation locks the team-quarters it touches, reloads what it
//! needs under the lock, runs one aggregator operation, commits a single
//! change set and returns the view of the affected team-quarter.

use okrs_shared::{GoalId, KeyResultId, TeamId};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use super::OkrService;
use super::views::TeamOkrView;
use crate::error::{OkrError, OkrResult};
use crate::goal::{Goal, GoalAggregator, GoalInput};
use crate::key_result::{KeyResultAggregator, KeyResultInput, StageUpdate};
use crate::locks::QuarterGuard;
use crate::ordering::{MoveDirection, next_order_index};
use crate::quarter::{EditKind, Quarter, QuarterScope, QuarterStatus, TeamQuarter};
use crate::repository::ChangeSet;
use crate::sharing::{ShareLink, ShareTarget, SharingResolver};

/// Attempts at locking a goal's teams before giving up when its links
/// keep changing underneath.
const LINK_LOCK_ATTEMPTS: usize = 3;

impl OkrService {
    /// Sets a team-quarter's status. Setting the current status is a no-op.
    pub async fn set_status(
        &self,
        team_id: TeamId,
        quarter: Quarter,
        status: QuarterStatus,
    ) -> OkrResult<TeamOkrView> {
        let key = TeamQuarter::new(team_id, quarter);
        self.require_team(team_id).await?;
        let _guard = self.locks.acquire([key]).await?;

        let current = self.load_quarter(key).await?;
        if let Some(status) = current.resolve_status_change(status)? {
            self.repo
                .apply(ChangeSet::default().set_status(key, Some(status)))
                .await?;
            info!(team_id = %team_id, quarter = %quarter, from = %current.status(), to = %status, "Quarter status changed");
        }
        self.view(key).await
    }

    /// Creates a goal in a team-quarter.
    pub async fn create_goal(
        &self,
        team_id: TeamId,
        quarter: Quarter,
        input: GoalInput,
    ) -> OkrResult<TeamOkrView> {
        let key = TeamQuarter::new(team_id, quarter);
        self.require_team(team_id).await?;
        let _guard = self.locks.acquire([key]).await?;

        let mut current = self.load_quarter(key).await?;
        let created = current.add_goal(input)?;
        let (goal, link) = (created.goal.clone(), created.link);
        let status = current.settled_status(current.goals().len());
        let goal_id = goal.id;

        self.repo
            .apply(
                ChangeSet::default()
                    .upsert_goal(goal)
                    .upsert_links([link])
                    .set_status(key, status),
            )
            .await?;
        info!(goal_id = %goal_id, team_id = %team_id, quarter = %quarter, "Goal created");
        self.view(key).await
    }

    /// Edits a goal's fields.
    pub async fn update_goal(&self, goal_id: GoalId, input: GoalInput) -> OkrResult<TeamOkrView> {
        self.edit_goal(goal_id, EditKind::UpdateGoal, move |scope, goal| {
            GoalAggregator::update_goal(scope, goal, input)
        })
        .await
    }

    /// Appends a comment to a goal.
    pub async fn add_goal_comment(&self, goal_id: GoalId, text: String) -> OkrResult<TeamOkrView> {
        self.edit_goal(goal_id, EditKind::AddComment, move |scope, goal| {
            GoalAggregator::add_comment(scope, goal, &text).map(|_| ())
        })
        .await
    }

    /// Deletes a goal with its key results and links. Every team-quarter
    /// the goal appears in must be unlocked; those left without goals fall
    /// back to `no_goals`.
    pub async fn delete_goal(&self, goal_id: GoalId) -> OkrResult<TeamOkrView> {
        let (_guard, goal, links) = self.lock_goal_teams(goal_id, &[]).await?;
        let origin = goal.origin();

        let mut changes = ChangeSet::default().delete_goal(goal_id);
        for team_id in teams_of(&goal, &links) {
            let key = TeamQuarter::new(team_id, goal.quarter);
            let current = self.load_quarter(key).await?;
            current.scope().authorize(EditKind::DeleteGoal)?;
            let remaining = current.goals().len().saturating_sub(1);
            changes = changes.set_status(key, current.settled_status(remaining));
        }

        self.repo.apply(changes).await?;
        info!(goal_id = %goal_id, team_id = %origin.team_id, quarter = %origin.quarter, "Goal deleted");
        self.view(origin).await
    }

    /// Moves a goal up or down within one team's listing, the origin's by
    /// default.
    pub async fn move_goal(
        &self,
        goal_id: GoalId,
        team_id: Option<TeamId>,
        direction: MoveDirection,
    ) -> OkrResult<TeamOkrView> {
        let goal = self.require_goal(goal_id).await?;
        let key = TeamQuarter::new(team_id.unwrap_or(goal.team_id), goal.quarter);
        let _guard = self.locks.acquire([key]).await?;

        let mut current = self.load_quarter(key).await?;
        let mut changes = ChangeSet::default();
        for entry in current.move_goal(goal_id, direction)? {
            changes = changes.upsert_links([entry.link]);
            if entry.is_origin() {
                changes = changes.upsert_goal(entry.goal.clone());
            }
        }

        if changes.is_empty() {
            debug!(goal_id = %goal_id, "Goal already at boundary");
        } else {
            self.repo.apply(changes).await?;
            info!(goal_id = %goal_id, team_id = %key.team_id, ?direction, "Goal moved");
        }
        self.view(key).await
    }

    /// Replaces the set of teams a goal is shared with.
    pub async fn share_goal(
        &self,
        goal_id: GoalId,
        targets: Vec<ShareTarget>,
    ) -> OkrResult<TeamOkrView> {
        let known: HashSet<TeamId> = self
            .repo
            .list_teams()
            .await?
            .into_iter()
            .map(|team| team.id)
            .collect();
        // Unknown targets are rejected by the plan and never locked.
        let extra: Vec<TeamId> = targets
            .iter()
            .map(|t| t.team_id)
            .filter(|team_id| known.contains(team_id))
            .collect();
        let (_guard, mut goal, links) = self.lock_goal_teams(goal_id, &extra).await?;
        let origin = goal.origin();

        let mut quarters = BTreeMap::new();
        for team_id in teams_of(&goal, &links).into_iter().chain(extra) {
            if known.contains(&team_id) && !quarters.contains_key(&team_id) {
                let key = TeamQuarter::new(team_id, goal.quarter);
                quarters.insert(team_id, self.load_quarter(key).await?);
            }
        }
        let next_order: BTreeMap<TeamId, u32> = quarters
            .iter()
            .map(|(team_id, q)| {
                (
                    *team_id,
                    next_order_index(q.goals().iter().map(|g| g.link.order_index)),
                )
            })
            .collect();

        let plan = SharingResolver::plan(&goal, &links, &targets, &known, &next_order)?;

        let mut changes = ChangeSet::default();
        for team_id in plan.affected() {
            let Some(current) = quarters.get(&team_id) else {
                continue;
            };
            current.scope().authorize(EditKind::ShareGoal)?;
            let count = current.goals().len();
            let status = if plan.added.contains(&team_id) {
                current.settled_status(count + 1)
            } else if plan.removed.contains(&team_id) {
                current.settled_status(count.saturating_sub(1))
            } else {
                None
            };
            changes = changes.set_status(current.key(), status);
        }

        if let Some(weight) = plan.weight_of(goal.team_id).filter(|w| *w != goal.weight) {
            goal.weight = weight;
            goal.updated_at = chrono::Utc::now();
            changes = changes.upsert_goal(goal);
        }
        changes = changes.replace_links(goal_id, plan.links.clone());

        self.repo.apply(changes).await?;
        info!(
            goal_id = %goal_id,
            added = plan.added.len(),
            removed = plan.removed.len(),
            reweighted = plan.reweighted.len(),
            "Goal shares replaced"
        );
        self.view(origin).await
    }

    /// Sets one team's weight for a goal. Returns that team's view.
    pub async fn update_goal_team_weight(
        &self,
        goal_id: GoalId,
        team_id: TeamId,
        weight: u32,
    ) -> OkrResult<TeamOkrView> {
        let goal = self.require_goal(goal_id).await?;
        let key = TeamQuarter::new(team_id, goal.quarter);
        let links = self.repo.list_share_links(goal_id).await?;
        SharingResolver::plan_weight_update(&goal, &links, team_id, weight)?;
        let _guard = self.locks.acquire([goal.origin(), key]).await?;

        let mut goal = self.require_goal(goal_id).await?;
        let links = self.repo.list_share_links(goal_id).await?;
        let planned = SharingResolver::plan_weight_update(&goal, &links, team_id, weight)?;
        self.load_quarter(key)
            .await?
            .scope()
            .authorize(EditKind::ChangeWeight)?;

        let mut changes = ChangeSet::default()
            .upsert_links(planned.into_iter().filter(|link| link.team_id == team_id));
        if team_id == goal.team_id {
            goal.weight = weight;
            goal.updated_at = chrono::Utc::now();
            changes = changes.upsert_goal(goal);
        }

        self.repo.apply(changes).await?;
        info!(goal_id = %goal_id, team_id = %team_id, weight, "Goal team weight updated");
        self.view(key).await
    }

    /// Adds a key result to a goal.
    pub async fn add_key_result(
        &self,
        goal_id: GoalId,
        input: KeyResultInput,
    ) -> OkrResult<TeamOkrView> {
        self.edit_goal(goal_id, EditKind::CreateKeyResult, move |scope, goal| {
            GoalAggregator::add_key_result(scope, goal, input).map(|_| ())
        })
        .await
    }

    /// Edits a key result.
    pub async fn update_key_result(
        &self,
        kr_id: KeyResultId,
        input: KeyResultInput,
    ) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::UpdateKeyResult, move |scope, goal| {
            GoalAggregator::update_key_result(scope, goal, kr_id, input)
        })
        .await
    }

    /// Deletes a key result.
    pub async fn delete_key_result(&self, kr_id: KeyResultId) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::DeleteKeyResult, move |scope, goal| {
            GoalAggregator::delete_key_result(scope, goal, kr_id)
        })
        .await
    }

    /// Moves a key result up or down within its goal.
    pub async fn move_key_result(
        &self,
        kr_id: KeyResultId,
        direction: MoveDirection,
    ) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::Reorder, move |scope, goal| {
            GoalAggregator::move_key_result(scope, goal, kr_id, direction).map(|_| ())
        })
        .await
    }

    /// Records the current value of a percent or linear key result.
    pub async fn set_percent_progress(
        &self,
        kr_id: KeyResultId,
        current: Decimal,
    ) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::UpdateProgress, move |scope, goal| {
            let kr = GoalAggregator::key_result_mut(goal, kr_id)?;
            KeyResultAggregator::set_percent_progress(scope, kr, current)
        })
        .await
    }

    /// Marks a boolean key result done or not done.
    pub async fn set_boolean_progress(
        &self,
        kr_id: KeyResultId,
        is_done: bool,
    ) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::UpdateProgress, move |scope, goal| {
            let kr = GoalAggregator::key_result_mut(goal, kr_id)?;
            KeyResultAggregator::set_boolean_progress(scope, kr, is_done)
        })
        .await
    }

    /// Sets stage completion flags of a project key result.
    pub async fn set_project_progress(
        &self,
        kr_id: KeyResultId,
        updates: Vec<StageUpdate>,
    ) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::UpdateProgress, move |scope, goal| {
            let kr = GoalAggregator::key_result_mut(goal, kr_id)?;
            KeyResultAggregator::set_project_progress(scope, kr, &updates)
        })
        .await
    }

    /// Appends a comment to a key result.
    pub async fn add_key_result_comment(
        &self,
        kr_id: KeyResultId,
        text: String,
    ) -> OkrResult<TeamOkrView> {
        let goal_id = self.require_goal_of(kr_id).await?.id;
        self.edit_goal(goal_id, EditKind::AddComment, move |scope, goal| {
            let kr = GoalAggregator::key_result_mut(goal, kr_id)?;
            KeyResultAggregator::add_comment(scope, kr, &text).map(|_| ())
        })
        .await
    }

    /// Runs one edit on a goal under its origin team-quarter lock and
    /// commits the goal together with its origin link.
    async fn edit_goal<F>(
        &self,
        goal_id: GoalId,
        operation: EditKind,
        edit: F,
    ) -> OkrResult<TeamOkrView>
    where
        F: FnOnce(&QuarterScope, &mut Goal) -> OkrResult<()> + Send,
    {
        let origin = self.require_goal(goal_id).await?.origin();
        let _guard = self.locks.acquire([origin]).await?;

        let mut goal = self.require_goal(goal_id).await?;
        let scope = self.load_quarter(origin).await?.scope();
        edit(&scope, &mut goal)?;

        let link = SharingResolver::origin_link(&goal);
        self.repo
            .apply(ChangeSet::default().upsert_goal(goal).upsert_links([link]))
            .await?;
        info!(
            goal_id = %goal_id,
            team_id = %origin.team_id,
            quarter = %origin.quarter,
            operation = %operation,
            "Goal updated"
        );
        self.view(origin).await
    }

    /// Locks the goal's origin, every team-quarter it is linked into and
    /// the quarters of `extra` teams. Retries when the links change while
    /// waiting.
    async fn lock_goal_teams(
        &self,
        goal_id: GoalId,
        extra: &[TeamId],
    ) -> OkrResult<(QuarterGuard, Goal, Vec<ShareLink>)> {
        let origin = self.require_goal(goal_id).await?.origin();
        let mut links = self.repo.list_share_links(goal_id).await?;

        for attempt in 1..=LINK_LOCK_ATTEMPTS {
            let keys = links
                .iter()
                .map(|link| link.team_id)
                .chain(extra.iter().copied())
                .chain([origin.team_id])
                .map(|team_id| TeamQuarter::new(team_id, origin.quarter));
            let guard = self.locks.acquire(keys).await?;

            let goal = self.require_goal(goal_id).await?;
            links = self.repo.list_share_links(goal_id).await?;
            if links
                .iter()
                .all(|link| guard.covers(&TeamQuarter::new(link.team_id, origin.quarter)))
            {
                return Ok((guard, goal, links));
            }
            debug!(goal_id = %goal_id, attempt, "Goal links changed while locking, retrying");
        }

        Err(OkrError::Busy {
            team_id: origin.team_id,
            quarter: origin.quarter,
        })
    }
}

/// The origin team followed by every other team the goal is linked into.
fn teams_of(goal: &Goal, links: &[ShareLink]) -> Vec<TeamId> {
    let mut teams = vec![goal.team_id];
    teams.extend(
        links
            .iter()
            .map(|link| link.team_id)
            .filter(|team| *team != goal.team_id),
    );
    teams
}
