//! Read-only team tree and its projections for listings and dashboards.

pub mod projector;
pub mod tree;

pub use projector::{GoalRow, HierarchyProjector, TeamOption, TeamRow};
pub use tree::{Team, TeamTree, TeamType};
