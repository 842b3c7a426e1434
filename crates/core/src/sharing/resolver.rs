//! Planning share link changes for a goal.

use okrs_shared::TeamId;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{OkrError, OkrResult};
use crate::goal::Goal;
use crate::sharing::types::{ShareLink, ShareTarget};
use crate::weight::{FULL_WEIGHT, validate_weight};

/// Outcome of a share request: the goal's complete new link set and the
/// teams whose membership changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePlan {
    /// Full link set after the change, origin first.
    pub links: Vec<ShareLink>,
    /// Teams that gained the goal.
    pub added: BTreeSet<TeamId>,
    /// Teams that lost the goal.
    pub removed: BTreeSet<TeamId>,
    /// Teams that keep the goal at a different weight.
    pub reweighted: BTreeSet<TeamId>,
}

impl SharePlan {
    /// Every team whose quarter changes under this plan.
    #[must_use]
    pub fn affected(&self) -> BTreeSet<TeamId> {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.reweighted)
            .copied()
            .collect()
    }

    /// The weight planned for a team.
    #[must_use]
    pub fn weight_of(&self, team_id: TeamId) -> Option<u32> {
        self.links
            .iter()
            .find(|link| link.team_id == team_id)
            .map(|link| link.weight)
    }
}

/// Stateless share link planning.
pub struct SharingResolver;

impl SharingResolver {
    /// A goal with a single link lives only in its origin team.
    #[must_use]
    pub fn is_shared(links: &[ShareLink]) -> bool {
        links.len() >= 2
    }

    /// The origin link implied by a goal's own weight and order index.
    #[must_use]
    pub const fn origin_link(goal: &Goal) -> ShareLink {
        ShareLink {
            goal_id: goal.id,
            team_id: goal.team_id,
            weight: goal.weight,
            order_index: goal.order_index,
        }
    }

    /// Makes the origin link mirror the goal, inserting it if missing.
    pub fn sync_origin(goal: &Goal, links: &mut Vec<ShareLink>) {
        let origin = Self::origin_link(goal);
        match links.iter_mut().find(|link| link.team_id == goal.team_id) {
            Some(link) => *link = origin,
            None => links.insert(0, origin),
        }
    }

    /// Plans replacing the goal's shares with `targets`.
    ///
    /// Listed teams are linked at the given weight, keeping their existing
    /// order index; unlisted teams other than the origin lose the goal. The
    /// origin link always survives, and listing the origin team changes the
    /// goal's own weight. `next_order` supplies the order index for teams
    /// that did not have the goal yet.
    ///
    /// # Errors
    /// `InvalidShareTarget` for an out-of-range weight, a team listed twice
    /// or a team that does not exist.
    pub fn plan(
        goal: &Goal,
        current: &[ShareLink],
        targets: &[ShareTarget],
        known_teams: &HashSet<TeamId>,
        next_order: &BTreeMap<TeamId, u32>,
    ) -> OkrResult<SharePlan> {
        let mut seen = HashSet::new();
        for target in targets {
            if target.weight > FULL_WEIGHT {
                return Err(invalid(
                    target.team_id,
                    format!("weight must be 0..100, got {}", target.weight),
                ));
            }
            if !seen.insert(target.team_id) {
                return Err(invalid(target.team_id, "team listed more than once"));
            }
            if !known_teams.contains(&target.team_id) {
                return Err(invalid(target.team_id, "unknown team"));
            }
        }

        let mut existing = current.to_vec();
        Self::sync_origin(goal, &mut existing);

        let mut plan = SharePlan {
            links: Vec::with_capacity(targets.len() + 1),
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
            reweighted: BTreeSet::new(),
        };

        let origin_target = targets.iter().find(|t| t.team_id == goal.team_id);
        let mut origin = Self::origin_link(goal);
        if let Some(target) = origin_target {
            if target.weight != origin.weight {
                plan.reweighted.insert(goal.team_id);
            }
            origin.weight = target.weight;
        }
        plan.links.push(origin);

        for target in targets.iter().filter(|t| t.team_id != goal.team_id) {
            match existing.iter().find(|link| link.team_id == target.team_id) {
                Some(link) => {
                    if link.weight != target.weight {
                        plan.reweighted.insert(target.team_id);
                    }
                    plan.links.push(ShareLink {
                        weight: target.weight,
                        ..*link
                    });
                }
                None => {
                    plan.added.insert(target.team_id);
                    plan.links.push(ShareLink {
                        goal_id: goal.id,
                        team_id: target.team_id,
                        weight: target.weight,
                        order_index: next_order.get(&target.team_id).copied().unwrap_or(0),
                    });
                }
            }
        }

        plan.removed = existing
            .iter()
            .map(|link| link.team_id)
            .filter(|team| *team != goal.team_id && !seen.contains(team))
            .collect();

        Ok(plan)
    }

    /// Plans setting one team's weight for the goal. Returns the full new
    /// link set.
    ///
    /// # Errors
    /// `Validation` for an out-of-range weight, `InvalidShareTarget` when the
    /// team does not have the goal.
    pub fn plan_weight_update(
        goal: &Goal,
        current: &[ShareLink],
        team_id: TeamId,
        weight: u32,
    ) -> OkrResult<Vec<ShareLink>> {
        validate_weight("share", weight)?;
        let mut links = current.to_vec();
        Self::sync_origin(goal, &mut links);
        let link = links
            .iter_mut()
            .find(|link| link.team_id == team_id)
            .ok_or_else(|| invalid(team_id, "team does not share this goal"))?;
        link.weight = weight;
        Ok(links)
    }
}

fn invalid(team_id: TeamId, reason: impl Into<String>) -> OkrError {
    OkrError::InvalidShareTarget {
        team_id,
        reason: reason.into(),
    }
}
