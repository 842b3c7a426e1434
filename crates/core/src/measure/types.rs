//! Measure domain types.
//!
//! A key result is measured by exactly one of four kinds. The union is
//! closed so every consumer handles all kinds exhaustively.

use okrs_shared::StageId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OkrError, OkrResult};
use crate::weight::validate_weight;

/// Discriminant of a [`Measure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasureKind {
    /// Value moving from start toward target, with optional checkpoints.
    Percent,
    /// Value moving from start toward target; target may be below start.
    Linear,
    /// Done or not done.
    Boolean,
    /// Weighted list of stages.
    Project,
}

impl MeasureKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "PERCENT",
            Self::Linear => "LINEAR",
            Self::Boolean => "BOOLEAN",
            Self::Project => "PROJECT",
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start, target and current value of a numeric measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Value at 0% progress.
    pub start_value: Decimal,
    /// Value at 100% progress.
    pub target_value: Decimal,
    /// Latest measured value.
    pub current_value: Decimal,
}

impl ValueRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(start_value: Decimal, target_value: Decimal, current_value: Decimal) -> Self {
        Self {
            start_value,
            target_value,
            current_value,
        }
    }
}

/// Intermediate point on a percent measure's progress curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Metric value at which the checkpoint is reached.
    pub value: Decimal,
    /// Progress percent reported at that value (0..=100).
    pub percent: u32,
}

/// Percent measure: a value range plus optional checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentMeasure {
    /// Value at 0% progress.
    pub start_value: Decimal,
    /// Value at 100% progress.
    pub target_value: Decimal,
    /// Latest measured value.
    pub current_value: Decimal,
    /// Checkpoints bending the progress curve.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkpoints: Vec<Checkpoint>,
}

impl PercentMeasure {
    /// Returns the value range without checkpoints.
    #[must_use]
    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.start_value, self.target_value, self.current_value)
    }
}

/// Boolean measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BooleanMeasure {
    /// Whether the key result is achieved.
    pub is_done: bool,
}

/// One weighted stage of a project measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage ID.
    pub id: StageId,
    /// Stage title.
    pub title: String,
    /// Contribution to progress when done (0..=100).
    pub weight: u32,
    /// Whether the stage is done.
    pub is_done: bool,
}

/// Project measure: an ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectMeasure {
    /// Stages in display order.
    pub stages: Vec<Stage>,
}

impl ProjectMeasure {
    /// Sum of all stage weights, done or not.
    #[must_use]
    pub fn weight_sum(&self) -> u32 {
        self.stages.iter().map(|s| s.weight).sum()
    }
}

/// The metric a key result is measured by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum Measure {
    /// Percent measure.
    Percent(PercentMeasure),
    /// Linear measure.
    Linear(ValueRange),
    /// Boolean measure.
    Boolean(BooleanMeasure),
    /// Project measure.
    Project(ProjectMeasure),
}

impl Measure {
    /// Returns the kind of this measure.
    #[must_use]
    pub const fn kind(&self) -> MeasureKind {
        match self {
            Self::Percent(_) => MeasureKind::Percent,
            Self::Linear(_) => MeasureKind::Linear,
            Self::Boolean(_) => MeasureKind::Boolean,
            Self::Project(_) => MeasureKind::Project,
        }
    }
}

/// Stage as supplied by a caller configuring a project measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSeed {
    /// Existing stage to keep, `None` to create a new one.
    #[serde(default)]
    pub id: Option<StageId>,
    /// Stage title.
    pub title: String,
    /// Stage weight (0..=100).
    pub weight: u32,
    /// Whether the stage starts out done.
    #[serde(default)]
    pub is_done: bool,
}

/// Measure configuration supplied when creating or editing a key result.
///
/// Identical to [`Measure`] except that project stages may omit their IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum MeasureSeed {
    /// Percent measure.
    Percent(PercentMeasure),
    /// Linear measure.
    Linear(ValueRange),
    /// Boolean measure.
    Boolean(BooleanMeasure),
    /// Project measure stages.
    Project {
        /// Stages in display order.
        #[serde(default)]
        stages: Vec<StageSeed>,
    },
}

impl MeasureSeed {
    /// Returns the kind this seed configures.
    #[must_use]
    pub const fn kind(&self) -> MeasureKind {
        match self {
            Self::Percent(_) => MeasureKind::Percent,
            Self::Linear(_) => MeasureKind::Linear,
            Self::Boolean(_) => MeasureKind::Boolean,
            Self::Project { .. } => MeasureKind::Project,
        }
    }

    /// Checks stage weights and checkpoint percents.
    pub fn validate(&self) -> OkrResult<()> {
        match self {
            Self::Percent(percent) => {
                for checkpoint in &percent.checkpoints {
                    if checkpoint.percent > 100 {
                        return Err(OkrError::Validation(format!(
                            "checkpoint percent must be 0..100, got {}",
                            checkpoint.percent
                        )));
                    }
                }
                Ok(())
            }
            Self::Project { stages } => {
                for stage in stages {
                    validate_weight("stage", stage.weight)?;
                    if stage.title.trim().is_empty() {
                        return Err(OkrError::Validation("stage title is required".into()));
                    }
                }
                Ok(())
            }
            Self::Linear(_) | Self::Boolean(_) => Ok(()),
        }
    }

    /// Builds the measure, keeping stage IDs the caller referenced and
    /// minting new ones for the rest.
    #[must_use]
    pub fn into_measure(self) -> Measure {
        match self {
            Self::Percent(percent) => Measure::Percent(percent),
            Self::Linear(range) => Measure::Linear(range),
            Self::Boolean(boolean) => Measure::Boolean(boolean),
            Self::Project { stages } => Measure::Project(ProjectMeasure {
                stages: stages
                    .into_iter()
                    .map(|seed| Stage {
                        id: seed.id.unwrap_or_default(),
                        title: seed.title.trim().to_string(),
                        weight: seed.weight,
                        is_done: seed.is_done,
                    })
                    .collect(),
            }),
        }
    }
}
