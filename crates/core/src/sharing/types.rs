//! Share link types.

use okrs_shared::{GoalId, TeamId};
use serde::{Deserialize, Serialize};

/// Membership of a goal in one team's quarter.
///
/// Every goal has a link for its origin team, mirroring the goal's own
/// weight and order index. Unique on `(goal_id, team_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    /// The shared goal.
    pub goal_id: GoalId,
    /// The team it appears in.
    pub team_id: TeamId,
    /// Contribution to that team's quarter progress (0..=100).
    pub weight: u32,
    /// Position in that team's quarter listing.
    pub order_index: u32,
}

/// A team a goal should be shared with, and at what weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTarget {
    /// Target team.
    pub team_id: TeamId,
    /// Weight in the target team's quarter.
    pub weight: u32,
}
