//! Advisory weight-sum checks.
//!
//! A sum other than 100 never blocks an operation. It is reported as a
//! [`ValidationWarning`] next to the data that produced it.

use okrs_shared::{GoalId, KeyResultId, TeamId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quarter::Quarter;
use crate::weight::FULL_WEIGHT;

/// A non-fatal weight inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Goal weights of a team-quarter do not add up to 100.
    GoalWeightSum {
        /// Team whose quarter is inconsistent.
        team_id: TeamId,
        /// The quarter.
        quarter: Quarter,
        /// Actual sum.
        sum: u32,
    },
    /// Key result weights of a goal do not add up to 100.
    KeyResultWeightSum {
        /// The goal.
        goal_id: GoalId,
        /// Actual sum.
        sum: u32,
    },
    /// Stage weights of a project key result do not add up to 100.
    StageWeightSum {
        /// The key result.
        key_result_id: KeyResultId,
        /// Actual sum.
        sum: u32,
    },
}

impl ValidationWarning {
    /// The offending sum.
    #[must_use]
    pub const fn sum(&self) -> u32 {
        match self {
            Self::GoalWeightSum { sum, .. }
            | Self::KeyResultWeightSum { sum, .. }
            | Self::StageWeightSum { sum, .. } => *sum,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoalWeightSum {
                team_id,
                quarter,
                sum,
            } => write!(
                f,
                "goal weights of team {team_id} in {quarter} sum to {sum}, expected {FULL_WEIGHT}"
            ),
            Self::KeyResultWeightSum { goal_id, sum } => write!(
                f,
                "key result weights of goal {goal_id} sum to {sum}, expected {FULL_WEIGHT}"
            ),
            Self::StageWeightSum { key_result_id, sum } => write!(
                f,
                "stage weights of key result {key_result_id} sum to {sum}, expected {FULL_WEIGHT}"
            ),
        }
    }
}

/// True when a non-empty set of siblings does not weigh 100 in total.
/// Empty sets are not flagged.
#[must_use]
pub const fn is_off_weight(sum: u32, count: usize) -> bool {
    count > 0 && sum != FULL_WEIGHT
}
