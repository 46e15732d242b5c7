//! Run execution service.
//!
//! A run loads the job, obtains step data when identification is needed,
//! identifies `J` and `b`, resolves the plant, tunes the controller and
//! stores the outcome next to the job file.

use std::path::Path;
use std::time::Instant;

use mt_controls::{PlantParameters, TransferFunction, build_plant};
use mt_ident::{IdentificationDataset, IdentificationResult};
use mt_project::schema::{DataSourceDef, MotorJob, SyntheticDef};
use mt_results::{RunManifest, RunReport, RunStore, RunType, TrajectoryRecord};
use mt_tune::TuneOutcome;

use crate::dataset_io;
use crate::error::{AppError, AppResult};
use crate::job_service;
use crate::progress::{RunProgressEvent, RunStage};
use crate::report;

/// What a run produces.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Fit `J` and `b` to the job's step data
    Identify,
    /// Identify when needed, then tune the PID controller
    Tune,
}

impl RunMode {
    fn run_type(&self) -> RunType {
        match self {
            RunMode::Identify => RunType::Identify,
            RunMode::Tune => RunType::Tune,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub solver_version: String,
    /// Write the run into the job's run store
    pub persist: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            solver_version: "0.1.0".to_string(),
            persist: true,
        }
    }
}

pub struct RunRequest<'a> {
    pub job_path: &'a Path,
    pub mode: RunMode,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub identify_time_s: f64,
    pub tune_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub report: RunReport,
    pub plant: TransferFunction,
    pub identification: Option<IdentificationResult>,
    pub tuning: Option<TuneOutcome>,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    mode: &RunMode,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            mode: mode.clone(),
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message: Some(message.to_string()),
        });
    }
}

/// Execute a run.
pub fn run_job(request: &RunRequest) -> AppResult<RunResponse> {
    run_job_with_progress(request, None)
}

/// Execute a run and stream progress events.
pub fn run_job_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();
    let mode = &request.mode;

    emit_progress(&mut progress_cb, mode, RunStage::LoadingJob, started, "Loading job");
    let job = job_service::load_job(request.job_path)?;
    tracing::info!(job = %job.name, mode = ?mode, "starting run");

    let identify_needed = match mode {
        RunMode::Identify => true,
        RunMode::Tune => job.needs_identification(),
    };

    let dataset = if identify_needed {
        emit_progress(
            &mut progress_cb,
            mode,
            RunStage::LoadingData,
            started,
            "Loading step data",
        );
        Some(load_dataset(request.job_path, &job)?)
    } else {
        None
    };
    timing.load_time_s = started.elapsed().as_secs_f64();

    let constants = job_service::motor_constants(&job);
    let include_inductance = job.motor.include_inductance;

    let identification = match &dataset {
        Some(dataset) => {
            emit_progress(
                &mut progress_cb,
                mode,
                RunStage::Identifying,
                started,
                "Identifying J and b",
            );
            let identify_started = Instant::now();
            let result = mt_ident::identify(
                dataset,
                constants,
                include_inductance,
                &job_service::identification_config(&job),
            )?;
            timing.identify_time_s = identify_started.elapsed().as_secs_f64();
            Some(result)
        }
        None => None,
    };

    let estimate = identification
        .as_ref()
        .map(|r| (r.estimated_j, r.estimated_b));
    let (params, plant) = resolve_plant(&job, estimate)?;

    let tuning = match mode {
        RunMode::Identify => None,
        RunMode::Tune => {
            emit_progress(
                &mut progress_cb,
                mode,
                RunStage::Tuning,
                started,
                "Tuning PID gains",
            );
            let tune_started = Instant::now();
            let outcome = mt_tune::tune(&plant, &job_service::tune_options(&job))?;
            timing.tune_time_s = tune_started.elapsed().as_secs_f64();
            Some(outcome)
        }
    };

    let run_report = RunReport {
        plant: report::plant_record(&params, &plant),
        identification: identification.as_ref().map(report::identification_record),
        tuning: tuning.as_ref().map(report::tuning_record),
    };
    let trajectories = report::trajectory_records(identification.as_ref(), tuning.as_ref());

    let run_type = mode.run_type();
    let run_id = mt_results::compute_run_id(&job, &run_type, &request.options.solver_version)?;
    let manifest = RunManifest::new(
        run_id.clone(),
        &job.name,
        run_type,
        &request.options.solver_version,
    );

    if request.options.persist {
        emit_progress(
            &mut progress_cb,
            mode,
            RunStage::SavingResults,
            started,
            "Saving results",
        );
        let save_started = Instant::now();
        save_run(request.job_path, &manifest, &run_report, &trajectories)?;
        timing.save_time_s = save_started.elapsed().as_secs_f64();
    }

    timing.total_time_s = started.elapsed().as_secs_f64();
    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::Completed,
        started,
        "Run completed",
    );
    tracing::info!(run_id = %run_id, total_s = timing.total_time_s, "run finished");

    Ok(RunResponse {
        run_id,
        manifest,
        report: run_report,
        plant,
        identification,
        tuning,
        timing,
    })
}

/// Resolve the motor parameters and build the plant.
///
/// Every parameter the model order uses must be strictly positive.
pub(crate) fn resolve_plant(
    job: &MotorJob,
    estimate: Option<(f64, f64)>,
) -> AppResult<(PlantParameters, TransferFunction)> {
    let params = PlantParameters::resolve(
        job_service::motor_constants(job),
        job_service::mechanical_param(job.motor.j),
        job_service::mechanical_param(job.motor.b),
        estimate,
        job.motor.include_inductance,
    )?;
    if !params.is_physical() {
        return Err(AppError::InvalidInput(format!(
            "job '{}' resolves to a non-physical motor (J={}, b={})",
            job.name, params.j, params.b
        )));
    }
    let plant = build_plant(&params)?;
    tracing::debug!(num = ?plant.num(), den = ?plant.den(), "plant resolved");
    Ok((params, plant))
}

fn save_run(
    job_path: &Path,
    manifest: &RunManifest,
    report: &RunReport,
    trajectories: &[TrajectoryRecord],
) -> AppResult<()> {
    let store = RunStore::for_job(job_path)?;
    store.save_run(manifest, report, trajectories)?;
    tracing::debug!(root = %store.root().display(), run_id = %manifest.run_id, "run saved");
    Ok(())
}

/// Step data named by the job: a CSV file or a synthetic experiment.
pub fn load_dataset(job_path: &Path, job: &MotorJob) -> AppResult<IdentificationDataset> {
    match &job.data {
        Some(DataSourceDef::Csv(path)) => {
            let path = job_service::resolve_data_path(job_path, path);
            dataset_io::read_dataset_csv(&path)
        }
        Some(DataSourceDef::Synthetic(def)) => synthesize_for(job, def),
        None => Err(AppError::InvalidInput(format!(
            "job '{}' has no data source for identification",
            job.name
        ))),
    }
}

fn synthesize_for(job: &MotorJob, def: &SyntheticDef) -> AppResult<IdentificationDataset> {
    let config = job_service::synthetic_config(job, def);
    Ok(mt_ident::synthesize(
        job_service::motor_constants(job),
        job.motor.include_inductance,
        &config,
    )?)
}

/// Generate step data for the job's motor and write it to `out`.
///
/// Uses the job's synthetic source when it has one, default true values
/// otherwise.
pub fn synthesize_dataset(job_path: &Path, out: &Path) -> AppResult<IdentificationDataset> {
    let job = job_service::load_job(job_path)?;
    let def = match &job.data {
        Some(DataSourceDef::Synthetic(def)) => def.clone(),
        _ => SyntheticDef::default(),
    };
    let dataset = synthesize_for(&job, &def)?;
    dataset_io::write_dataset_csv(out, &dataset)?;
    tracing::info!(out = %out.display(), samples = dataset.len(), "wrote synthetic data");
    Ok(dataset)
}

/// Runs stored for a job, most recent first.
pub fn list_runs(job_path: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_job(job_path)?;
    let mut runs = store.list_runs()?;
    runs.reverse();
    Ok(runs)
}

/// Load a stored run.
pub fn load_run(
    job_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, RunReport, Vec<TrajectoryRecord>)> {
    let store = RunStore::for_job(job_path)?;
    let manifest = store.load_manifest(run_id)?;
    let report = store.load_report(run_id)?;
    let trajectories = store.load_trajectories(run_id)?;
    Ok((manifest, report, trajectories))
}
