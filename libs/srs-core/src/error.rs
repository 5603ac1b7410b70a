//! Error types for srs-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the core calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid grade {value}: must be in 0..=5")]
    InvalidGrade { value: u8 },
}
