//! Content-based hashing for run IDs.

use mt_project::schema::MotorJob;
use sha2::{Digest, Sha256};

use crate::ResultsResult;
use crate::types::{RunId, RunType};

/// SHA-256 over the job, the run type and the solver version.
///
/// Identical inputs always map to the same id, so re-running an unchanged
/// job overwrites its previous result.
pub fn compute_run_id(
    job: &MotorJob,
    run_type: &RunType,
    solver_version: &str,
) -> ResultsResult<RunId> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(job)?.as_bytes());
    hasher.update(serde_json::to_string(run_type)?.as_bytes());
    hasher.update(solver_version.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
