//! Storage errors.

use okrs_core::OkrError;
use thiserror::Error;

/// Failures of the in-memory store and its snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a snapshot file failed.
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A snapshot or change set references data that does not exist.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// The snapshot was written by an incompatible version.
    #[error("Unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
}

impl From<StoreError> for OkrError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
