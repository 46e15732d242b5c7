//! Result data types.
//!
//! Records hold plain numbers so they serialize to JSON directly.
//! Infinite or NaN metric values are stored as `null`.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub job_name: String,
    /// RFC 3339 creation time
    pub timestamp: String,
    pub run_type: RunType,
    pub solver_version: String,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(run_id: RunId, job_name: &str, run_type: RunType, solver_version: &str) -> Self {
        Self {
            run_id,
            job_name: job_name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            run_type,
            solver_version: solver_version.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunType {
    /// Identification only
    Identify,
    /// Full pipeline, identification when needed followed by tuning
    Tune,
}

/// `Some(v)` for finite values.
pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantRecord {
    pub r: f64,
    pub l: f64,
    pub j: f64,
    pub b: f64,
    pub kt: f64,
    pub ke: f64,
    pub include_inductance: bool,
    pub num: Vec<f64>,
    pub den: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentificationRecord {
    pub estimated_j: f64,
    pub estimated_b: f64,
    pub rmse: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
    pub j_at_bound: bool,
    pub b_at_bound: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsRecord {
    pub steady_state_value: Option<f64>,
    pub percent_overshoot: Option<f64>,
    pub settling_time: Option<f64>,
    pub rise_time: Option<f64>,
    pub steady_state_error: Option<f64>,
    pub integral_absolute_error: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GainsRecord {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub derivative_filter: bool,
    pub filter_time_constant: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TuningRecord {
    pub gains: GainsRecord,
    pub grid_gains: GainsRecord,
    pub closed_loop_num: Vec<f64>,
    pub closed_loop_den: Vec<f64>,
    pub metrics: MetricsRecord,
    pub p_only_metrics: MetricsRecord,
    pub pi_only_metrics: MetricsRecord,
    pub grid_score: f64,
    pub nelder_mead_score: f64,
    pub powell_score: f64,
    pub final_score: f64,
    pub evaluations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub plant: PlantRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<IdentificationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<TuningRecord>,
}

/// One labelled `(t, y)` series, such as `measured`, `fitted` or `pid`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryRecord {
    pub label: String,
    pub t: Vec<f64>,
    /// Non-finite samples are stored as `null`
    pub y: Vec<Option<f64>>,
}

impl TrajectoryRecord {
    pub fn new(label: &str, t: &[f64], y: &[f64]) -> Self {
        Self {
            label: label.to_string(),
            t: t.to_vec(),
            y: y.iter().copied().map(finite).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_metrics_serialize_as_null() {
        let m = MetricsRecord {
            steady_state_value: finite(1.0),
            percent_overshoot: finite(0.0),
            settling_time: finite(f64::INFINITY),
            rise_time: finite(f64::NAN),
            steady_state_error: finite(0.0),
            integral_absolute_error: finite(0.2),
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"settling_time\":null"));
        assert!(json.contains("\"rise_time\":null"));
        let back: MetricsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn trajectory_drops_non_finite_samples() {
        let r = TrajectoryRecord::new("pid", &[0.0, 1.0], &[0.5, f64::INFINITY]);
        assert_eq!(r.y, vec![Some(0.5), None]);
    }
}
