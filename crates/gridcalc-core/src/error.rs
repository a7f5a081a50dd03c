//! Error types for gridcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid column-letter run (empty, non A-Z, or out of range)
    #[error("Invalid column letters: {0:?}")]
    InvalidColumnLetters(String),

    /// Column index out of the representable range
    #[error("Column index {0} out of range")]
    ColumnOutOfRange(u64),
}
