//! Error types for Quickcraft.

use thiserror::Error;

use crate::version::SchemaVersion;

/// Top-level error type for Quickcraft operations.
///
/// Ranking itself never fails; these errors come from loading the data
/// the ranking runs over.
#[derive(Debug, Error)]
pub enum QuickcraftError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data failed validation after parsing
    #[error("Validation error: {0}")]
    Validation(String),

    /// Data file version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: SchemaVersion,
        /// Actual version found
        actual: SchemaVersion,
    },
}

/// Result type alias for Quickcraft operations.
pub type QuickcraftResult<T> = Result<T, QuickcraftError>;
