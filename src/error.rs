//! Error types
//!
//! Two tiers: [`FuzzError`] aborts a whole invocation before any row is
//! processed, while [`RowError`] is carried as a value next to a single row's
//! output and never stops the rest of the batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invocation-level failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuzzError {
    /// Method identifier is not part of the method table
    #[error("unknown method '{0}'")]
    UnsupportedMethod(String),

    /// Mode is neither `pairwise` nor `best_match`
    #[error("unknown mode '{0}' (expected 'pairwise' or 'best_match')")]
    UnsupportedMode(String),

    /// An option value is out of range or malformed
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// Pairwise columns must be row-aligned
    #[error("pairwise columns must have equal length (left={left}, right={right})")]
    ColumnLengthMismatch { left: usize, right: usize },

    /// Command line or payload could not be understood
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// Dedicated worker pool could not be created
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

/// Convenience alias for invocation-level results.
pub type Result<T> = std::result::Result<T, FuzzError>;

/// Per-row failures. The row's output carries a sentinel instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowError {
    /// Hamming-style method applied to strings of unequal length
    #[error("strings differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    /// Best-match search was given no reference entries
    #[error("reference list is empty")]
    EmptyReferenceList,

    /// Input cell is not valid UTF-8
    #[error("column {column} holds malformed UTF-8")]
    EncodingError { column: usize },
}
