//! mt-project: motor job file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_job};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported job file extension: {extension}")]
    UnknownFormat { extension: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<MotorJob> {
    let content = std::fs::read_to_string(path)?;
    let job: MotorJob = serde_yaml::from_str(&content)?;
    validate_job(&job)?;
    Ok(job)
}

pub fn save_yaml(path: &Path, job: &MotorJob) -> ProjectResult<()> {
    validate_job(job)?;
    let content = serde_yaml::to_string(job)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<MotorJob> {
    let content = std::fs::read_to_string(path)?;
    let job: MotorJob = serde_json::from_str(&content)?;
    validate_job(&job)?;
    Ok(job)
}

pub fn save_json(path: &Path, job: &MotorJob) -> ProjectResult<()> {
    validate_job(job)?;
    let content = serde_json::to_string_pretty(job)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a job file, choosing the format from the extension
/// (`.yaml`/`.yml` or `.json`).
pub fn load_job(path: &Path) -> ProjectResult<MotorJob> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "yaml" | "yml" => load_yaml(path),
        "json" => load_json(path),
        _ => Err(ProjectError::UnknownFormat { extension }),
    }
}
