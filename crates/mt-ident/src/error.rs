//! Error types for identification.

use thiserror::Error;

/// Errors that abort an identification run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentError {
    #[error("Insufficient data: {what}")]
    InsufficientData { what: String },

    #[error("Malformed data: {what}")]
    MalformedData { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Control model error: {0}")]
    Control(#[from] mt_controls::ControlError),

    #[error("Simulation error: {0}")]
    Sim(#[from] mt_sim::SimError),

    #[error("Solver error: {0}")]
    Solver(#[from] mt_solver::SolverError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] mt_core::MtError),
}

pub type IdentResult<T> = Result<T, IdentError>;
