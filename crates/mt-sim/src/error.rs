//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during step-response simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Improper transfer function: num degree {num_degree} > den degree {den_degree}")]
    Improper {
        num_degree: usize,
        den_degree: usize,
    },

    #[error("Time grid must be strictly increasing")]
    NonMonotonicTime,

    #[error("Control model error: {0}")]
    Control(#[from] mt_controls::ControlError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] mt_core::MtError),
}

pub type SimResult<T> = Result<T, SimError>;
