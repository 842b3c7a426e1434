//! Key results: metadata, measure and comment log of a single KR.

pub mod aggregator;
pub mod types;

pub use aggregator::KeyResultAggregator;
pub use types::{KeyResult, KeyResultInput, StageUpdate};
