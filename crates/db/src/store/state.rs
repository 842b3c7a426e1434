//! Plain data held by the store, and change set application.

use okrs_core::ChangeSet;
use okrs_core::goal::Goal;
use okrs_core::hierarchy::Team;
use okrs_core::quarter::{QuarterGoal, QuarterStatus, TeamQuarter};
use okrs_core::sharing::ShareLink;
use okrs_shared::{GoalId, KeyResultId, TeamId};
use std::collections::{BTreeMap, HashMap};

use crate::error::StoreError;

/// Everything the store knows.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub(crate) teams: BTreeMap<TeamId, Team>,
    pub(crate) goals: HashMap<GoalId, Goal>,
    pub(crate) links: BTreeMap<(GoalId, TeamId), ShareLink>,
    pub(crate) statuses: HashMap<TeamQuarter, QuarterStatus>,
}

impl State {
    pub(crate) fn goal_of(&self, kr_id: KeyResultId) -> Option<&Goal> {
        self.goals
            .values()
            .find(|goal| goal.key_results.iter().any(|kr| kr.id == kr_id))
    }

    pub(crate) fn links_of(&self, goal_id: GoalId) -> Vec<ShareLink> {
        self.links
            .range((goal_id, TeamId::from_u128(0))..=(goal_id, TeamId::from_u128(u128::MAX)))
            .map(|(_, link)| *link)
            .collect()
    }

    pub(crate) fn quarter_goals(&self, key: TeamQuarter) -> Vec<QuarterGoal> {
        self.links
            .values()
            .filter(|link| link.team_id == key.team_id)
            .filter_map(|link| {
                let goal = self.goals.get(&link.goal_id)?;
                (goal.quarter == key.quarter).then(|| QuarterGoal {
                    link: *link,
                    goal: goal.clone(),
                    shares: self.links_of(goal.id),
                })
            })
            .collect()
    }

    /// Applies a change set in place. Callers apply to a copy and swap it
    /// in only on success.
    pub(crate) fn apply(&mut self, changes: ChangeSet) -> Result<(), StoreError> {
        for goal in changes.goals {
            if !self.teams.contains_key(&goal.team_id) {
                return Err(StoreError::Integrity(format!(
                    "goal {} belongs to unknown team {}",
                    goal.id, goal.team_id
                )));
            }
            self.goals.insert(goal.id, goal);
        }

        for goal_id in changes.deleted_goals {
            self.goals.remove(&goal_id);
            self.links.retain(|(owner, _), _| *owner != goal_id);
        }

        for (goal_id, links) in changes.replaced_links {
            self.links.retain(|(owner, _), _| *owner != goal_id);
            for link in links {
                self.insert_link(link)?;
            }
        }

        for link in changes.links {
            self.insert_link(link)?;
        }

        for (key, status) in changes.statuses {
            self.statuses.insert(key, status);
        }
        Ok(())
    }

    fn insert_link(&mut self, link: ShareLink) -> Result<(), StoreError> {
        if !self.goals.contains_key(&link.goal_id) {
            return Err(StoreError::Integrity(format!(
                "link to missing goal {}",
                link.goal_id
            )));
        }
        if !self.teams.contains_key(&link.team_id) {
            return Err(StoreError::Integrity(format!(
                "link to unknown team {}",
                link.team_id
            )));
        }
        self.links.insert((link.goal_id, link.team_id), link);
        Ok(())
    }
}
