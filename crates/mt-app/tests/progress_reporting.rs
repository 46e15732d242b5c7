//! Progress events and timing reported by the run service.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use mt_app::{
    RunMode, RunOptions, RunProgressEvent, RunRequest, RunResponse, RunStage,
    run_job_with_progress,
};

fn scratch_copy(prefix: &str, demo: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).unwrap();
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    fs::copy(demos.join(demo), dir.join(demo)).unwrap();
    dir.join(demo)
}

fn collect_events(request: &RunRequest<'_>) -> (RunResponse, Vec<RunProgressEvent>) {
    let mut events = Vec::new();
    let response = run_job_with_progress(request, Some(&mut |event| events.push(event)))
        .expect("run with progress should succeed");
    (response, events)
}

fn stages(events: &[RunProgressEvent]) -> Vec<RunStage> {
    events.iter().map(|e| e.stage.clone()).collect()
}

#[test]
fn identify_run_reports_each_stage() {
    let job = scratch_copy("mt_progress_identify", "reference_motor.yaml");
    let request = RunRequest {
        job_path: &job,
        mode: RunMode::Identify,
        options: RunOptions::default(),
    };

    let (response, events) = collect_events(&request);

    assert_eq!(
        stages(&events),
        [
            RunStage::LoadingJob,
            RunStage::LoadingData,
            RunStage::Identifying,
            RunStage::SavingResults,
            RunStage::Completed,
        ]
    );
    assert!(events.iter().all(|e| e.mode == RunMode::Identify));
    assert!(
        events
            .windows(2)
            .all(|w| w[0].elapsed_wall_s <= w[1].elapsed_wall_s)
    );
    assert!(response.timing.identify_time_s > 0.0);
    assert_eq!(response.timing.tune_time_s, 0.0);
    assert!(response.timing.total_time_s >= response.timing.identify_time_s);

    fs::remove_dir_all(job.parent().unwrap()).ok();
}

#[test]
fn tune_run_without_unknowns_goes_straight_to_tuning() {
    let job = scratch_copy("mt_progress_tune", "known_motor.yaml");
    let request = RunRequest {
        job_path: &job,
        mode: RunMode::Tune,
        options: RunOptions {
            persist: false,
            ..RunOptions::default()
        },
    };

    let (response, events) = collect_events(&request);

    assert_eq!(
        stages(&events),
        [RunStage::LoadingJob, RunStage::Tuning, RunStage::Completed]
    );
    assert!(response.timing.tune_time_s > 0.0);
    assert_eq!(response.timing.save_time_s, 0.0);

    fs::remove_dir_all(job.parent().unwrap()).ok();
}
