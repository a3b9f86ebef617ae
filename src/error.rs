//! Error types for the factor-norm library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum NormError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid size factor: {0}")]
    InvalidFactor(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, NormError>;
