//! The organization's team tree.

use okrs_shared::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Entity, OkrError, OkrResult};

/// Organizational level of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamType {
    /// Top-level grouping of units.
    Cluster,
    /// Group of teams.
    Unit,
    /// Delivery team.
    Team,
}

/// A node of the organization tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team ID.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Organizational level.
    pub type_label: TeamType,
    /// Parent team, `None` for roots.
    #[serde(default)]
    pub parent_id: Option<TeamId>,
}

/// Immutable team tree with children sorted by name.
#[derive(Debug, Clone, Default)]
pub struct TeamTree {
    teams: HashMap<TeamId, Team>,
    roots: Vec<TeamId>,
    children: HashMap<TeamId, Vec<TeamId>>,
}

impl TeamTree {
    /// Builds the tree. Teams whose parent is unknown become roots.
    ///
    /// # Errors
    /// `InvalidHierarchy` when the parent links form a cycle or an ID is
    /// used twice.
    pub fn build(teams: Vec<Team>) -> OkrResult<Self> {
        let mut by_id = HashMap::with_capacity(teams.len());
        for team in teams {
            let id = team.id;
            if by_id.insert(id, team).is_some() {
                return Err(OkrError::InvalidHierarchy(format!("duplicate team {id}")));
            }
        }

        for team in by_id.values() {
            let mut steps = 0;
            let mut cursor = team.parent_id;
            while let Some(parent) = cursor.and_then(|id| by_id.get(&id)) {
                steps += 1;
                if parent.id == team.id || steps > by_id.len() {
                    return Err(OkrError::InvalidHierarchy(format!(
                        "team {} is its own ancestor",
                        team.id
                    )));
                }
                cursor = parent.parent_id;
            }
        }

        let mut roots = Vec::new();
        let mut children: HashMap<TeamId, Vec<TeamId>> = HashMap::new();
        for team in by_id.values() {
            match team.parent_id.filter(|id| by_id.contains_key(id)) {
                Some(parent) => children.entry(parent).or_default().push(team.id),
                None => roots.push(team.id),
            }
        }

        let by_name = |ids: &mut Vec<TeamId>| {
            ids.sort_by(|a, b| {
                let (ta, tb) = (&by_id[a], &by_id[b]);
                ta.name.cmp(&tb.name).then(ta.id.cmp(&tb.id))
            });
        };
        by_name(&mut roots);
        for ids in children.values_mut() {
            by_name(ids);
        }

        Ok(Self {
            teams: by_id,
            roots,
            children,
        })
    }

    /// Looks up a team.
    #[must_use]
    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Number of teams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// True when the tree has no teams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Depth-first walk over every team with its depth, roots at depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self, self.roots.iter().rev().map(|id| (*id, 0)).collect())
    }

    /// Depth-first walk over `root` and its descendants. Depths are
    /// relative to the full tree.
    ///
    /// # Errors
    /// `NotFound` when `root` is not in the tree.
    pub fn subtree(&self, root: TeamId) -> OkrResult<Walk<'_>> {
        if !self.teams.contains_key(&root) {
            return Err(OkrError::not_found(Entity::Team, root));
        }
        Ok(Walk::new(self, vec![(root, self.depth(root))]))
    }

    fn depth(&self, id: TeamId) -> usize {
        let mut depth = 0;
        let mut cursor = self.teams.get(&id).and_then(|t| t.parent_id);
        while let Some(parent) = cursor.and_then(|p| self.teams.get(&p)) {
            depth += 1;
            cursor = parent.parent_id;
        }
        depth
    }
}

/// Lazy depth-first iterator over a [`TeamTree`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    tree: &'a TeamTree,
    stack: Vec<(TeamId, usize)>,
}

impl<'a> Walk<'a> {
    const fn new(tree: &'a TeamTree, stack: Vec<(TeamId, usize)>) -> Self {
        Self { tree, stack }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Team);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, depth) = self.stack.pop()?;
            let Some(team) = self.tree.teams.get(&id) else {
                continue;
            };
            if let Some(children) = self.tree.children.get(&id) {
                self.stack
                    .extend(children.iter().rev().map(|child| (*child, depth + 1)));
            }
            return Some((depth, team));
        }
    }
}
