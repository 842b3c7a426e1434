//! Listings and dashboard rows built from the team tree.

use okrs_shared::{GoalId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::OkrResult;
use crate::goal::GoalAggregator;
use crate::hierarchy::tree::{Team, TeamTree, TeamType};
use crate::quarter::{QuarterStatus, TeamQuarterAggregator};
use crate::sharing::SharingResolver;

/// Horizontal indent per depth level in dashboard rows.
pub const INDENT_STEP: usize = 24;

/// One entry of an indented team picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamOption {
    /// Team ID.
    pub id: TeamId,
    /// Team name.
    pub name: String,
    /// Name prefixed with the depth marker.
    pub label: String,
    /// Depth in the tree, roots at 0.
    pub depth: usize,
    /// Organizational level.
    pub type_label: TeamType,
    /// Whether this is the selected team.
    pub selected: bool,
}

/// Summary of one goal inside a dashboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRow {
    /// Goal ID.
    pub goal_id: GoalId,
    /// Title.
    pub title: String,
    /// This team's weight for the goal.
    pub weight: u32,
    /// Goal progress.
    pub progress: u32,
    /// Whether the goal appears in more than one team.
    pub is_shared: bool,
    /// Team the goal originates in.
    pub origin_team_id: TeamId,
}

/// A team's quarter summary in hierarchy order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRow {
    /// The team.
    pub team: Team,
    /// Depth in the tree.
    pub depth: usize,
    /// Indent in pixels.
    pub indent: usize,
    /// Effective quarter status.
    pub status: QuarterStatus,
    /// Team-quarter progress. Parents do not include their children.
    pub progress: u32,
    /// Number of goals.
    pub goals_count: usize,
    /// Sum of goal weights.
    pub goals_weight: u32,
    /// False when goals exist and their weights do not add up to 100.
    pub goals_weight_ok: bool,
    /// Goals in display order.
    pub goals: Vec<GoalRow>,
}

/// Read-only projections of the team tree.
pub struct HierarchyProjector;

impl HierarchyProjector {
    /// Label prefix for a depth: nothing for roots, then two spaces per
    /// extra level followed by `|-- `.
    #[must_use]
    pub fn prefix(depth: usize) -> String {
        if depth == 0 {
            String::new()
        } else {
            format!("{}|-- ", "  ".repeat(depth - 1))
        }
    }

    /// Indented picker entries in depth-first order.
    ///
    /// Lazy; call again to restart.
    pub fn render(
        tree: &TeamTree,
        selected: Option<TeamId>,
    ) -> impl Iterator<Item = TeamOption> + '_ {
        tree.walk().map(move |(depth, team)| TeamOption {
            id: team.id,
            name: team.name.clone(),
            label: format!("{}{}", Self::prefix(depth), team.name),
            depth,
            type_label: team.type_label,
            selected: selected == Some(team.id),
        })
    }

    /// One row per team in hierarchy order, optionally limited to the
    /// subtree of `org`. Teams without loaded quarter data are reported
    /// empty.
    ///
    /// # Errors
    /// `NotFound` when `org` is not in the tree.
    pub fn teams_with_progress(
        tree: &TeamTree,
        org: Option<TeamId>,
        quarters: &HashMap<TeamId, TeamQuarterAggregator>,
    ) -> OkrResult<Vec<TeamRow>> {
        let walk = match org {
            Some(root) => tree.subtree(root)?,
            None => tree.walk(),
        };
        Ok(walk
            .map(|(depth, team)| Self::row(depth, team, quarters.get(&team.id)))
            .collect())
    }

    fn row(depth: usize, team: &Team, quarter: Option<&TeamQuarterAggregator>) -> TeamRow {
        let Some(quarter) = quarter else {
            return TeamRow {
                team: team.clone(),
                depth,
                indent: depth * INDENT_STEP,
                status: QuarterStatus::NoGoals,
                progress: 0,
                goals_count: 0,
                goals_weight: 0,
                goals_weight_ok: true,
                goals: Vec::new(),
            };
        };
        TeamRow {
            team: team.clone(),
            depth,
            indent: depth * INDENT_STEP,
            status: quarter.status(),
            progress: quarter.progress(),
            goals_count: quarter.goals().len(),
            goals_weight: quarter.goal_weight_sum(),
            goals_weight_ok: quarter.goal_weight_ok(),
            goals: quarter
                .goals()
                .iter()
                .map(|g| GoalRow {
                    goal_id: g.goal.id,
                    title: g.goal.title.clone(),
                    weight: g.link.weight,
                    progress: GoalAggregator::progress(&g.goal),
                    is_shared: SharingResolver::is_shared(&g.shares),
                    origin_team_id: g.goal.team_id,
                })
                .collect(),
        }
    }
}
