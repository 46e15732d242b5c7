//! End-to-end runs over the demo jobs, executed in scratch directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use mt_app::{
    AppError, RunMode, RunOptions, RunRequest, list_runs, load_run, run_job, synthesize_dataset,
};

fn scratch_copy(prefix: &str, demo: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).unwrap();
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    for name in [demo, "step_data.csv"] {
        fs::copy(demos.join(name), dir.join(name)).unwrap();
    }
    dir.join(demo)
}

fn request(job_path: &Path, mode: RunMode) -> RunRequest<'_> {
    RunRequest {
        job_path,
        mode,
        options: RunOptions::default(),
    }
}

#[test]
fn reference_motor_is_identified_and_tuned() {
    let job = scratch_copy("mt_app_reference", "reference_motor.yaml");

    let response = run_job(&request(&job, RunMode::Tune)).expect("tune run failed");

    let id = response.identification.as_ref().expect("identification ran");
    assert!((id.estimated_j - 0.01).abs() / 0.01 < 0.01, "J = {}", id.estimated_j);
    assert!((id.estimated_b - 0.1).abs() / 0.1 < 0.01, "b = {}", id.estimated_b);
    assert!(id.rmse < 1e-6);

    let tuning = response.tuning.as_ref().expect("tuning ran");
    assert!(tuning.metrics.steady_state_error < 1e-3);
    assert!(tuning.gains.kp >= 0.0 && tuning.gains.ki >= 0.0 && tuning.gains.kd >= 0.0);
    assert!(tuning.scores.powell <= tuning.scores.grid);

    let (manifest, report, trajectories) =
        load_run(&job, &response.run_id).expect("stored run loads");
    assert_eq!(manifest, response.manifest);
    assert_eq!(report, response.report);
    let labels: Vec<_> = trajectories.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["measured", "fitted", "pid", "p_only", "pi_only"]);

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn known_motor_skips_identification() {
    let job = scratch_copy("mt_app_known", "known_motor.yaml");

    let response = run_job(&request(&job, RunMode::Tune)).expect("tune run failed");
    assert!(response.identification.is_none());
    assert!(response.report.identification.is_none());
    assert_eq!(response.report.plant.j, 0.02);
    assert!(!response.report.plant.include_inductance);
    assert!(response.tuning.is_some());

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn csv_data_identifies_inertia_and_keeps_known_damping() {
    let job = scratch_copy("mt_app_csv", "csv_motor.json");

    let response = run_job(&request(&job, RunMode::Identify)).expect("identify run failed");
    assert!(response.tuning.is_none());

    let id = response.identification.as_ref().unwrap();
    assert!((id.estimated_j - 0.01).abs() / 0.01 < 0.02, "J = {}", id.estimated_j);
    assert_eq!(response.report.plant.b, 0.1);
    assert_eq!(response.report.plant.j, id.estimated_j);

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn missing_csv_is_fatal() {
    let job = scratch_copy("mt_app_missing", "csv_motor.json");
    fs::remove_file(job.with_file_name("step_data.csv")).unwrap();

    let err = run_job(&request(&job, RunMode::Identify)).unwrap_err();
    assert!(matches!(err, AppError::DatasetRead { .. }), "{err}");
    assert!(list_runs(&job).unwrap().is_empty());

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn identify_without_data_source_is_rejected() {
    let job = scratch_copy("mt_app_nodata", "known_motor.yaml");

    let err = run_job(&request(&job, RunMode::Identify)).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "{err}");

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn runs_are_listed_newest_first() {
    let job = scratch_copy("mt_app_list", "csv_motor.json");

    let first = run_job(&request(&job, RunMode::Identify)).unwrap();
    let second = run_job(&request(&job, RunMode::Tune)).unwrap();
    assert_ne!(first.run_id, second.run_id);

    let runs = list_runs(&job).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, second.run_id);

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn unpersisted_runs_leave_no_store() {
    let job = scratch_copy("mt_app_nopersist", "known_motor.yaml");
    let request = RunRequest {
        job_path: &job,
        mode: RunMode::Tune,
        options: RunOptions {
            persist: false,
            ..RunOptions::default()
        },
    };

    run_job(&request).unwrap();
    assert!(!job.with_file_name(".motortune").exists());

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn synthesized_data_round_trips_through_csv() {
    let job = scratch_copy("mt_app_synth", "reference_motor.yaml");
    let out = job.with_file_name("synthetic.csv");

    let dataset = synthesize_dataset(&job, &out).unwrap();
    let back = mt_app::read_dataset_csv(&out).unwrap();
    assert_eq!(back.len(), dataset.len());
    assert_eq!(back.len(), 301);
    for (a, b) in back.output().iter().zip(dataset.output()) {
        assert!((a - b).abs() < 1e-6);
    }

    fs::remove_dir_all(job.parent().unwrap()).ok();
}
