//! Shared application service layer for motortune.
//!
//! Frontends call into this crate to load jobs, read or synthesize
//! identification data, run the identify/tune pipeline and query stored runs.

pub mod dataset_io;
pub mod error;
pub mod job_service;
pub mod progress;
pub mod report;
pub mod run_service;

pub use dataset_io::{parse_dataset_csv, read_dataset_csv, write_dataset_csv};
pub use error::{AppError, AppResult};
pub use job_service::{load_job, resolve_data_path, tune_options, validate_job};
pub use progress::{RunProgressEvent, RunStage};
pub use run_service::{
    RunMode, RunOptions, RunRequest, RunResponse, RunTimingSummary, list_runs, load_dataset,
    load_run, run_job, run_job_with_progress, synthesize_dataset,
};
