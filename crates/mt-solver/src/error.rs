//! Error types for optimizer operations.

use thiserror::Error;

/// Errors that can occur while setting up or running an optimizer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Dimension mismatch: {what} (expected {expected}, got {actual})")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Residual evaluation failed: {message}")]
    Residual { message: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;
