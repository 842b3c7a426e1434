//! Key result domain types.

use chrono::{DateTime, Utc};
use okrs_shared::{GoalId, KeyResultId, StageId};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::measure::{Measure, MeasureSeed};

/// A weighted, measurable key result belonging to one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyResult {
    /// Key result ID.
    pub id: KeyResultId,
    /// Owning goal.
    pub goal_id: GoalId,
    /// Title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Contribution to goal progress (0..=100).
    pub weight: u32,
    /// Position among the goal's key results.
    pub order_index: u32,
    /// Configured metric, `None` until one is chosen.
    #[serde(default)]
    pub measure: Option<Measure>,
    /// Append-only comment log.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl KeyResult {
    /// The most recently appended comment.
    #[must_use]
    pub fn latest_comment(&self) -> Option<&Comment> {
        self.comments.last()
    }
}

/// Fields supplied when creating or editing a key result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyResultInput {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Weight (0..=100).
    pub weight: u32,
    /// Measure configuration. On edit, `None` keeps the current measure.
    #[serde(default)]
    pub measure: Option<MeasureSeed>,
}

/// Completion flag for one project stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageUpdate {
    /// Stage to update.
    pub stage_id: StageId,
    /// New completion flag.
    pub is_done: bool,
}
