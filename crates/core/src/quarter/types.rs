//! Quarter identity, lifecycle status and the structural-edit lock policy.

use chrono::{Datelike, NaiveDate};
use okrs_shared::TeamId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OkrError, OkrResult};

/// A calendar quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quarter {
    /// Calendar year.
    pub year: i32,
    /// Quarter number, 1..=4.
    pub quarter: u8,
}

impl Quarter {
    /// Creates a quarter, rejecting quarter numbers outside 1..=4.
    pub fn new(year: i32, quarter: u8) -> OkrResult<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(OkrError::Validation(format!(
                "quarter must be 1..4, got {quarter}"
            )));
        }
        Ok(Self { year, quarter })
    }

    /// The quarter containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let quarter = u8::try_from(date.month0() / 3 + 1).unwrap_or(1);
        Self {
            year: date.year(),
            quarter,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

/// Key of a team's quarter: the unit of locking and status.
///
/// Ordered by team first so lock acquisition follows ascending team id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamQuarter {
    /// The team.
    pub team_id: TeamId,
    /// The quarter.
    pub quarter: Quarter,
}

impl TeamQuarter {
    /// Creates a key.
    #[must_use]
    pub const fn new(team_id: TeamId, quarter: Quarter) -> Self {
        Self { team_id, quarter }
    }
}

impl fmt::Display for TeamQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.team_id, self.quarter)
    }
}

/// Lifecycle status of a team's OKR set for one quarter.
///
/// Transitions are not enforced in order: any settable status may be set
/// from any other. `NoGoals` is derived from an empty quarter and cannot be
/// set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarterStatus {
    /// No goals attached yet.
    NoGoals,
    /// Goals are being drafted.
    Forming,
    /// Goals are ready and being worked on.
    InProgress,
    /// Goals were validated; structure is locked.
    Validated,
    /// Quarter is closed; structure is locked.
    Closed,
}

impl QuarterStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::NoGoals,
        Self::Forming,
        Self::InProgress,
        Self::Validated,
        Self::Closed,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoGoals => "no_goals",
            Self::Forming => "forming",
            Self::InProgress => "in_progress",
            Self::Validated => "validated",
            Self::Closed => "closed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "no_goals" => Some(Self::NoGoals),
            "forming" => Some(Self::Forming),
            "in_progress" => Some(Self::InProgress),
            "validated" => Some(Self::Validated),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns true if structural edits are rejected in this status.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Validated | Self::Closed)
    }

    /// Returns true if callers may set this status explicitly.
    #[must_use]
    pub const fn is_settable(self) -> bool {
        !matches!(self, Self::NoGoals)
    }

    /// Status a team-quarter reports given what is stored and whether it
    /// has any goals.
    #[must_use]
    pub const fn effective(stored: Option<Self>, has_goals: bool) -> Self {
        match stored {
            None | Some(Self::NoGoals) => {
                if has_goals {
                    Self::Forming
                } else {
                    Self::NoGoals
                }
            }
            Some(status) => status,
        }
    }
}

impl fmt::Display for QuarterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every mutating operation the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Add a goal to a team-quarter.
    CreateGoal,
    /// Edit goal fields (title, priority, weight, ...).
    UpdateGoal,
    /// Delete a goal and everything under it.
    DeleteGoal,
    /// Change a team's share weight for a goal.
    ChangeWeight,
    /// Share a goal into, or withdraw it from, a team-quarter.
    ShareGoal,
    /// Add a key result.
    CreateKeyResult,
    /// Edit key result fields or its measure configuration.
    UpdateKeyResult,
    /// Delete a key result.
    DeleteKeyResult,
    /// Record a measured value, flag or stage completion.
    UpdateProgress,
    /// Append a comment.
    AddComment,
    /// Move a goal or key result up or down.
    Reorder,
}

impl EditKind {
    /// Returns the string representation of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateGoal => "create_goal",
            Self::UpdateGoal => "update_goal",
            Self::DeleteGoal => "delete_goal",
            Self::ChangeWeight => "change_weight",
            Self::ShareGoal => "share_goal",
            Self::CreateKeyResult => "create_key_result",
            Self::UpdateKeyResult => "update_key_result",
            Self::DeleteKeyResult => "delete_key_result",
            Self::UpdateProgress => "update_progress",
            Self::AddComment => "add_comment",
            Self::Reorder => "reorder",
        }
    }

    /// Returns true if the operation changes the structure of a quarter's
    /// OKRs. Only structural edits are blocked by a locked quarter.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::UpdateProgress | Self::AddComment | Self::Reorder)
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team-quarter together with its effective status, consulted by every
/// mutating operation before it touches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterScope {
    /// The team-quarter.
    pub key: TeamQuarter,
    /// Its effective status.
    pub status: QuarterStatus,
}

impl QuarterScope {
    /// Creates a scope.
    #[must_use]
    pub const fn new(key: TeamQuarter, status: QuarterStatus) -> Self {
        Self { key, status }
    }

    /// Rejects structural edits while the quarter is locked.
    pub fn authorize(&self, operation: EditKind) -> OkrResult<()> {
        if operation.is_structural() && self.status.is_locked() {
            return Err(OkrError::QuarterLocked {
                team_id: self.key.team_id,
                quarter: self.key.quarter,
                status: self.status,
                operation,
            });
        }
        Ok(())
    }
}
