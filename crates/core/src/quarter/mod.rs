//! Team-quarter lifecycle and progress rollup.
//!
//! # Modules
//!
//! - `types` - Quarter, QuarterStatus, EditKind and the lock policy
//! - `aggregator` - Goals attached to one team-quarter and their rollup

pub mod aggregator;
pub mod types;

pub use aggregator::{QuarterGoal, TeamQuarterAggregator};
pub use types::{EditKind, Quarter, QuarterScope, QuarterStatus, TeamQuarter};
