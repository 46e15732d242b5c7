use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use mt_results::{
    PlantRecord, ResultsError, RunManifest, RunReport, RunStore, RunType, TrajectoryRecord,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn report() -> RunReport {
    RunReport {
        plant: PlantRecord {
            r: 1.0,
            l: 0.5,
            j: 0.01,
            b: 0.1,
            kt: 0.01,
            ke: 0.01,
            include_inductance: true,
            num: vec![0.01],
            den: vec![0.005, 0.06, 0.1001],
        },
        identification: None,
        tuning: None,
    }
}

#[test]
fn save_list_load_roundtrip() {
    let job_dir = unique_temp_dir("mt_results_job");
    fs::create_dir_all(&job_dir).expect("failed to create temp job dir");
    let job_path = job_dir.join("motor.yaml");
    fs::write(&job_path, "version: 1\n").expect("failed to write job file");

    let store = RunStore::for_job(&job_path).expect("failed to create run store");
    assert!(store.root().ends_with(".motortune/runs"));

    let manifest = RunManifest {
        run_id: "run-123".to_string(),
        job_name: "motor".to_string(),
        timestamp: "2026-02-26T00:00:00Z".to_string(),
        run_type: RunType::Tune,
        solver_version: "0.1.0".to_string(),
    };
    let trajectories = vec![
        TrajectoryRecord::new("pid", &[0.0, 0.5], &[0.0, 0.9]),
        TrajectoryRecord::new("p_only", &[0.0, 0.5], &[0.0, 0.4]),
    ];

    store
        .save_run(&manifest, &report(), &trajectories)
        .expect("failed to save run");
    assert!(store.has_run("run-123"));

    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0], manifest);

    assert_eq!(store.load_report("run-123").unwrap(), report());
    assert_eq!(store.load_trajectories("run-123").unwrap(), trajectories);

    store.delete_run("run-123").unwrap();
    assert!(!store.has_run("run-123"));
}

#[test]
fn missing_run_is_reported() {
    let store = RunStore::new(unique_temp_dir("mt_results_empty")).unwrap();
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(store.list_runs().unwrap().is_empty());
}

#[test]
fn new_manifest_carries_rfc3339_timestamp() {
    let m = RunManifest::new("abc".to_string(), "job", RunType::Identify, "0.1.0");
    assert!(chrono::DateTime::parse_from_rfc3339(&m.timestamp).is_ok());
}
