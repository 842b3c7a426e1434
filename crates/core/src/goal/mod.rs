//! Goals: weighted key result sets with a comment log.

pub mod aggregator;
pub mod types;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::GoalAggregator;
pub use types::{FocusType, Goal, GoalInput, Priority, WorkType};
