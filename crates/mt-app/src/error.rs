//! Error types for the mt-app service layer.

use std::path::PathBuf;

/// Application error shared by every frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Job error: {0}")]
    Job(String),

    #[error("Failed to read dataset {path}: {message}")]
    DatasetRead { path: PathBuf, message: String },

    #[error("Failed to write dataset {path}: {message}")]
    DatasetWrite { path: PathBuf, message: String },

    #[error("Identification failed: {0}")]
    Identification(#[from] mt_ident::IdentError),

    #[error("Tuning failed: {0}")]
    Tuning(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mt-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<mt_project::ProjectError> for AppError {
    fn from(err: mt_project::ProjectError) -> Self {
        AppError::Job(err.to_string())
    }
}

impl From<mt_tune::TuneError> for AppError {
    fn from(err: mt_tune::TuneError) -> Self {
        AppError::Tuning(err.to_string())
    }
}

impl From<mt_controls::ControlError> for AppError {
    fn from(err: mt_controls::ControlError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<mt_results::ResultsError> for AppError {
    fn from(err: mt_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
