//! Core error types.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by columns, selections, tables and the aggregation layer.
///
/// Missing values are never reported through this type; every predicate and
/// reduction has a defined result for them.
#[derive(Debug, Error)]
pub enum Error {
    /// A row or rank index outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Two columns, or a column and a selection, disagree in size.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A column name lookup failed.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A column with the same (case-insensitive) name already exists.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// A predicate or reduction was applied to a column type that does not support it.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A value could not be parsed or is outside its valid domain.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Configuration could not be decoded.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Error::OutOfRange { index, len }
    }

    pub(crate) fn length_mismatch(expected: usize, actual: usize) -> Self {
        Error::LengthMismatch { expected, actual }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedOperation(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidData(message.into())
    }
}
