//! In-memory OKR repository.

mod state;

pub(crate) use state::State;

use async_trait::async_trait;
use okrs_core::goal::Goal;
use okrs_core::hierarchy::Team;
use okrs_core::quarter::{QuarterGoal, QuarterStatus, TeamQuarter};
use okrs_core::sharing::ShareLink;
use okrs_core::{ChangeSet, OkrRepository, OkrResult};
use okrs_shared::{GoalId, KeyResultId, TeamId};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::snapshot::Snapshot;

/// Repository keeping all state in memory behind a single lock.
///
/// Change sets are applied to a copy of the state that replaces the
/// original only when every write succeeded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that knows the given teams.
    #[must_use]
    pub fn with_teams(teams: impl IntoIterator<Item = Team>) -> Self {
        let state = State {
            teams: teams.into_iter().map(|team| (team.id, team)).collect(),
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copies the current state into a snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot::capture(&state)
    }

    /// Replaces the current state with a snapshot's contents.
    ///
    /// # Errors
    /// Returns an error if the snapshot is internally inconsistent.
    pub async fn restore(&self, snapshot: Snapshot) -> Result<(), crate::StoreError> {
        let restored = snapshot.into_state()?;
        *self.state.write().await = restored;
        Ok(())
    }

    /// Builds a store from a snapshot.
    ///
    /// # Errors
    /// Returns an error if the snapshot is internally inconsistent.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, crate::StoreError> {
        Ok(Self {
            state: RwLock::new(snapshot.into_state()?),
        })
    }
}

#[async_trait]
impl OkrRepository for MemoryStore {
    async fn list_teams(&self) -> OkrResult<Vec<Team>> {
        Ok(self.state.read().await.teams.values().cloned().collect())
    }

    async fn get_team(&self, team_id: TeamId) -> OkrResult<Option<Team>> {
        Ok(self.state.read().await.teams.get(&team_id).cloned())
    }

    async fn get_goal(&self, goal_id: GoalId) -> OkrResult<Option<Goal>> {
        Ok(self.state.read().await.goals.get(&goal_id).cloned())
    }

    async fn find_goal_by_key_result(&self, kr_id: KeyResultId) -> OkrResult<Option<Goal>> {
        Ok(self.state.read().await.goal_of(kr_id).cloned())
    }

    async fn list_share_links(&self, goal_id: GoalId) -> OkrResult<Vec<ShareLink>> {
        Ok(self.state.read().await.links_of(goal_id))
    }

    async fn list_quarter_goals(&self, key: TeamQuarter) -> OkrResult<Vec<QuarterGoal>> {
        Ok(self.state.read().await.quarter_goals(key))
    }

    async fn get_quarter_status(&self, key: TeamQuarter) -> OkrResult<Option<QuarterStatus>> {
        Ok(self.state.read().await.statuses.get(&key).copied())
    }

    async fn apply(&self, changes: ChangeSet) -> OkrResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let summary = (
            changes.goals.len(),
            changes.deleted_goals.len(),
            changes.links.len() + changes.replaced_links.len(),
            changes.statuses.len(),
        );
        if let Err(err) = next.apply(changes) {
            error!(error = %err, "Change set rejected");
            return Err(err.into());
        }
        *state = next;
        debug!(
            goals = summary.0,
            deleted = summary.1,
            links = summary.2,
            statuses = summary.3,
            "Change set applied"
        );
        Ok(())
    }
}
