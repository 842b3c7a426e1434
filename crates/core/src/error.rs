//! Error types for OKR engine operations.
//!
//! Every failure is per-request and recoverable: callers either retry
//! (`Busy`) or correct their input. Weight-sum mismatches are not errors;
//! see [`crate::validation::ValidationWarning`].

use okrs_shared::TeamId;
use thiserror::Error;

use crate::measure::MeasureKind;
use crate::quarter::{EditKind, Quarter, QuarterStatus};

/// Result type alias using `OkrError`.
pub type OkrResult<T> = Result<T, OkrError>;

/// Kind of entity referenced by a `NotFound` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A team in the organization tree.
    Team,
    /// A quarterly goal.
    Goal,
    /// A key result.
    KeyResult,
    /// A project stage.
    Stage,
}

impl Entity {
    /// Returns the string representation of the entity kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Goal => "goal",
            Self::KeyResult => "key result",
            Self::Stage => "stage",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during OKR operations.
#[derive(Debug, Error)]
pub enum OkrError {
    /// Referenced team, goal, key result or stage does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing entity.
        entity: Entity,
        /// Identifier that was looked up.
        id: String,
    },

    /// The operation does not match the key result's configured measure kind.
    #[error("Key result {kr_id} is measured as {actual}, cannot apply {expected} progress")]
    InvalidMeasureKind {
        /// The key result being updated.
        kr_id: String,
        /// Kind(s) the operation applies to.
        expected: &'static str,
        /// Kind configured on the key result, `none` when unconfigured.
        actual: String,
    },

    /// Structural edit attempted while the team-quarter is locked.
    #[error("{operation} rejected: team {team_id} quarter {quarter} is {status}")]
    QuarterLocked {
        /// Team owning the locked quarter.
        team_id: TeamId,
        /// The locked quarter.
        quarter: Quarter,
        /// Current (locked) status.
        status: QuarterStatus,
        /// The rejected operation.
        operation: EditKind,
    },

    /// A share target is unknown, duplicated or carries an invalid weight.
    #[error("Invalid share target {team_id}: {reason}")]
    InvalidShareTarget {
        /// The offending team.
        team_id: TeamId,
        /// Why it was rejected.
        reason: String,
    },

    /// Comment text is blank after trimming.
    #[error("Comment text is required")]
    EmptyComment,

    /// A team-quarter write lock could not be acquired in time.
    #[error("Team {team_id} quarter {quarter} is busy, retry the request")]
    Busy {
        /// Team whose quarter lock timed out.
        team_id: TeamId,
        /// The contended quarter.
        quarter: Quarter,
    },

    /// Input failed field validation (weight range, quarter number, status).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The team tree is malformed.
    #[error("Invalid team hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The persistence collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl OkrError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: Entity, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidMeasureKind { .. } | Self::QuarterLocked { .. } => 409,
            Self::InvalidShareTarget { .. } | Self::EmptyComment | Self::Validation(_) => 400,
            Self::Busy { .. } => 503,
            Self::InvalidHierarchy(_) | Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidMeasureKind { .. } => "INVALID_MEASURE_KIND",
            Self::QuarterLocked { .. } => "QUARTER_LOCKED",
            Self::InvalidShareTarget { .. } => "INVALID_SHARE_TARGET",
            Self::EmptyComment => "EMPTY_COMMENT",
            Self::Busy { .. } => "BUSY",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidHierarchy(_) => "INVALID_HIERARCHY",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the same request may succeed when retried unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Builds an `InvalidMeasureKind` error for a key result.
pub(crate) fn wrong_kind(
    kr_id: impl std::fmt::Display,
    expected: &'static str,
    actual: Option<MeasureKind>,
) -> OkrError {
    OkrError::InvalidMeasureKind {
        kr_id: kr_id.to_string(),
        expected,
        actual: actual.map_or_else(|| "none".to_string(), |kind| kind.to_string()),
    }
}
