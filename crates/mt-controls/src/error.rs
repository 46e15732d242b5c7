//! Error types for control model operations.

use thiserror::Error;

/// Result type for control model operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while building or composing transfer functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Denominator polynomial has no non-zero coefficient.
    #[error("Degenerate denominator: {what}")]
    DegenerateDenominator { what: String },

    /// A coefficient is NaN or infinite.
    #[error("Non-finite coefficient in {what}")]
    NonFinite { what: &'static str },

    /// A mechanical parameter is still unknown where a value is required.
    #[error("Unresolved parameter: {name}")]
    Unresolved { name: &'static str },
}
