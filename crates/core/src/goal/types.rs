//! Goal domain types.

use chrono::{DateTime, Utc};
use okrs_shared::{GoalId, KeyResultId, TeamId};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::key_result::KeyResult;
use crate::quarter::{Quarter, TeamQuarter};

/// Goal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Highest.
    P0,
    /// High.
    P1,
    /// Normal.
    P2,
    /// Low.
    P3,
}

/// Kind of work a goal represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkType {
    /// Research and validation.
    Discovery,
    /// Building and shipping.
    Delivery,
}

/// Strategic focus of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusType {
    /// Revenue and margins.
    Profitability,
    /// Reliability.
    Stability,
    /// Speed and efficiency.
    SpeedEfficiency,
    /// Reducing external dependencies.
    TechIndependence,
}

/// A quarterly goal owned by one team.
///
/// `weight` and `order_index` describe the goal inside its origin team's
/// quarter; teams it is shared with carry their own values on the share
/// link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal ID.
    pub id: GoalId,
    /// Originating team.
    pub team_id: TeamId,
    /// Quarter the goal belongs to.
    pub quarter: Quarter,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Weight in the origin team-quarter (0..=100).
    pub weight: u32,
    /// Work type.
    pub work_type: WorkType,
    /// Focus.
    pub focus_type: FocusType,
    /// Owner, free text.
    #[serde(default)]
    pub owner_text: String,
    /// Position in the origin team-quarter.
    pub order_index: u32,
    /// Key results sorted by `order_index`.
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
    /// Append-only comment log.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// The origin team-quarter.
    #[must_use]
    pub const fn origin(&self) -> TeamQuarter {
        TeamQuarter::new(self.team_id, self.quarter)
    }

    /// Looks up a key result.
    #[must_use]
    pub fn key_result(&self, id: KeyResultId) -> Option<&KeyResult> {
        self.key_results.iter().find(|kr| kr.id == id)
    }
}

/// Editable goal fields, used on create and on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalInput {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Weight (0..=100).
    pub weight: u32,
    /// Work type.
    pub work_type: WorkType,
    /// Focus.
    pub focus_type: FocusType,
    /// Owner, free text.
    #[serde(default)]
    pub owner_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(Priority::P2).unwrap(), "P2");
        assert_eq!(serde_json::to_value(WorkType::Discovery).unwrap(), "Discovery");
        assert_eq!(
            serde_json::to_value(FocusType::SpeedEfficiency).unwrap(),
            "SPEED_EFFICIENCY"
        );
        let focus: FocusType = serde_json::from_value("TECH_INDEPENDENCE".into()).unwrap();
        assert_eq!(focus, FocusType::TechIndependence);
    }
}
