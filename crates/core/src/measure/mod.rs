//! Key result measures and progress computation.
//!
//! # Modules
//!
//! - `types` - The closed `Measure` union and its seeds
//! - `engine` - Pure progress computation for every measure kind

pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{MeasureEngine, MeasureProgress, MeasureStatus};
pub use types::{
    BooleanMeasure, Checkpoint, Measure, MeasureKind, MeasureSeed, PercentMeasure,
    ProjectMeasure, Stage, StageSeed, ValueRange,
};
