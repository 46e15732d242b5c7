//! Error types for auto-tuning.

use thiserror::Error;

/// Errors that abort a tuning run.
///
/// Candidate failures during the search never surface here; they are
/// scored with the penalty value instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TuneError {
    #[error("Invalid option: {what}")]
    InvalidOption { what: String },

    #[error("Control model error: {0}")]
    Control(#[from] mt_controls::ControlError),

    #[error("Simulation error: {0}")]
    Sim(#[from] mt_sim::SimError),

    #[error("Solver error: {0}")]
    Solver(#[from] mt_solver::SolverError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] mt_core::MtError),
}

pub type TuneResult<T> = Result<T, TuneError>;
