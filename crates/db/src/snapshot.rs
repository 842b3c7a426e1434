//! JSON snapshots of the whole store.

use okrs_core::ChangeSet;
use okrs_core::goal::Goal;
use okrs_core::hierarchy::Team;
use okrs_core::quarter::{Quarter, QuarterStatus, TeamQuarter};
use okrs_core::sharing::ShareLink;
use okrs_shared::TeamId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::StoreError;
use crate::store::State;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Stored status of one team-quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Team.
    pub team_id: TeamId,
    /// Quarter.
    pub quarter: Quarter,
    /// Stored status.
    pub status: QuarterStatus,
}

/// Serializable copy of everything in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Teams.
    pub teams: Vec<Team>,
    /// Goals with key results and comments.
    pub goals: Vec<Goal>,
    /// Share links.
    pub share_links: Vec<ShareLink>,
    /// Stored quarter statuses.
    pub statuses: Vec<StatusRecord>,
}

impl Snapshot {
    pub(crate) fn capture(state: &State) -> Self {
        let mut goals: Vec<Goal> = state.goals.values().cloned().collect();
        goals.sort_by_key(|goal| goal.id);
        let mut statuses: Vec<StatusRecord> = state
            .statuses
            .iter()
            .map(|(key, status)| StatusRecord {
                team_id: key.team_id,
                quarter: key.quarter,
                status: *status,
            })
            .collect();
        statuses.sort_by_key(|record| (record.team_id, record.quarter));
        Self {
            version: SNAPSHOT_VERSION,
            teams: state.teams.values().cloned().collect(),
            goals,
            share_links: state.links.values().copied().collect(),
            statuses,
        }
    }

    pub(crate) fn into_state(self) -> Result<State, StoreError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let mut state = State {
            teams: self.teams.into_iter().map(|team| (team.id, team)).collect(),
            ..State::default()
        };
        state.apply(ChangeSet {
            goals: self.goals,
            links: self.share_links,
            statuses: self
                .statuses
                .into_iter()
                .map(|record| (TeamQuarter::new(record.team_id, record.quarter), record.status))
                .collect(),
            ..ChangeSet::default()
        })?;
        Ok(state)
    }

    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let snapshot: Self = serde_json::from_slice(&bytes)?;
        info!(path = %path.display(), goals = snapshot.goals.len(), "Snapshot loaded");
        Ok(snapshot)
    }

    /// Writes the snapshot as pretty JSON, replacing the file atomically.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        info!(path = %path.display(), goals = self.goals.len(), "Snapshot saved");
        Ok(())
    }
}
