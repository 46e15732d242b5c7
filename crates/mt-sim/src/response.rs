//! Step-response evaluation and performance metrics.
//!
//! Metrics are extracted from the sampled trajectory with first-crossing
//! semantics and never fail on degenerate data:
//! - a zero steady-state value is replaced by `1e-9` in ratios
//! - thresholds that are never reached yield `+inf`
//! - non-finite samples propagate into the affected metrics only

use mt_controls::TransferFunction;
use mt_core::{linspace, trapezoid};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::simulate::{Trajectory, simulate_step};

/// Substitute for a zero steady-state value in ratios.
pub const STEADY_STATE_EPS: f64 = 1e-9;
/// Settling band as a fraction of the steady-state value.
pub const SETTLING_BAND: f64 = 0.02;
/// Lower rise-time threshold as a fraction of the steady-state value.
pub const RISE_LOW: f64 = 0.1;
/// Upper rise-time threshold as a fraction of the steady-state value.
pub const RISE_HIGH: f64 = 0.9;

/// Options for step-response runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Height of the applied step
    pub step_magnitude: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Number of evenly spaced samples over `[0, t_end]`
    pub n_points: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            step_magnitude: 1.0,
            t_end: 4.0,
            n_points: 1600,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.t_end > 0.0) || !self.t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "t_end must be positive and finite",
            });
        }
        if self.n_points < 2 {
            return Err(SimError::InvalidArg {
                what: "n_points must be at least 2",
            });
        }
        if !self.step_magnitude.is_finite() {
            return Err(SimError::InvalidArg {
                what: "step_magnitude must be finite",
            });
        }
        Ok(())
    }

    /// Evenly spaced simulation grid over `[0, t_end]`.
    pub fn time_grid(&self) -> Vec<f64> {
        linspace(0.0, self.t_end, self.n_points)
    }
}

/// Time-domain performance of a step response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Output at the final sample.
    pub steady_state_value: f64,
    /// Peak excursion above steady state, percent, never negative.
    pub percent_overshoot: f64,
    /// First time inside the 2 % band, `+inf` if never.
    pub settling_time: f64,
    /// 10 % to 90 % first-crossing interval, `+inf` if a threshold is missed.
    pub rise_time: f64,
    /// `|step - steady_state_value|`.
    pub steady_state_error: f64,
    /// Trapezoidal integral of `|step - y(t)|`.
    pub integral_absolute_error: f64,
}

impl PerformanceMetrics {
    /// True when every metric is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.steady_state_value,
            self.percent_overshoot,
            self.settling_time,
            self.rise_time,
            self.steady_state_error,
            self.integral_absolute_error,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Simulated trajectory together with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResponse {
    pub trajectory: Trajectory,
    pub metrics: PerformanceMetrics,
}

fn first_time_where(t: &[f64], y: &[f64], pred: impl Fn(f64) -> bool) -> Option<f64> {
    y.iter().position(|v| pred(*v)).map(|i| t[i])
}

/// Extract metrics from a sampled step response.
pub fn compute_metrics(
    trajectory: &Trajectory,
    step_magnitude: f64,
) -> SimResult<PerformanceMetrics> {
    let t = &trajectory.t;
    let y = &trajectory.y;
    if t.len() != y.len() {
        return Err(SimError::InvalidArg {
            what: "trajectory time and output lengths differ",
        });
    }
    let yss = trajectory.last_output().ok_or(SimError::InvalidArg {
        what: "trajectory must not be empty",
    })?;

    let yss_ratio = if yss != 0.0 { yss } else { STEADY_STATE_EPS };
    let peak = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let percent_overshoot = ((peak - yss_ratio) / yss_ratio * 100.0).max(0.0);

    let band = SETTLING_BAND * if yss != 0.0 { yss.abs() } else { 1.0 };
    let settling_time =
        first_time_where(t, y, |v| (v - yss).abs() <= band).unwrap_or(f64::INFINITY);

    let t_low = first_time_where(t, y, |v| v >= RISE_LOW * yss);
    let t_high = first_time_where(t, y, |v| v >= RISE_HIGH * yss);
    let rise_time = match (t_low, t_high) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => f64::INFINITY,
    };

    let abs_error: Vec<f64> = y.iter().map(|v| (step_magnitude - v).abs()).collect();
    let integral_absolute_error = trapezoid(t, &abs_error)?;

    Ok(PerformanceMetrics {
        steady_state_value: yss,
        percent_overshoot,
        settling_time,
        rise_time,
        steady_state_error: (step_magnitude - yss).abs(),
        integral_absolute_error,
    })
}

/// Simulate the scaled step response of `tf` and extract its metrics.
pub fn evaluate_step_response(tf: &TransferFunction, opts: &SimOptions) -> SimResult<StepResponse> {
    opts.validate()?;
    let trajectory = simulate_step(tf, opts.step_magnitude, &opts.time_grid())?;
    let metrics = compute_metrics(&trajectory, opts.step_magnitude)?;
    if !trajectory.is_finite() {
        tracing::trace!("step response contains non-finite samples");
    }
    Ok(StepResponse {
        trajectory,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traj(t: Vec<f64>, y: Vec<f64>) -> Trajectory {
        Trajectory { t, y }
    }

    #[test]
    fn monotonic_response_has_no_overshoot() {
        let tf = TransferFunction::new(vec![1.0], vec![0.2, 1.0]).unwrap();
        let r = evaluate_step_response(&tf, &SimOptions::default()).unwrap();
        assert_eq!(r.metrics.percent_overshoot, 0.0);
        assert!(r.metrics.rise_time.is_finite());
        assert!(r.metrics.settling_time.is_finite());
        assert_eq!(r.trajectory.len(), 1600);
    }

    #[test]
    fn first_order_rise_time_is_tau_ln9() {
        let tau = 0.2;
        let tf = TransferFunction::new(vec![1.0], vec![tau, 1.0]).unwrap();
        let opts = SimOptions {
            t_end: 4.0,
            n_points: 40_001,
            step_magnitude: 1.0,
        };
        let r = evaluate_step_response(&tf, &opts).unwrap();
        let expected = tau * 9.0_f64.ln();
        assert!((r.metrics.rise_time - expected).abs() < 2e-4);
    }

    #[test]
    fn underdamped_overshoot_matches_damping() {
        // wn = 10, zeta = 0.2 -> PO = exp(-zeta pi / sqrt(1 - zeta^2))
        let wn: f64 = 10.0;
        let zeta: f64 = 0.2;
        let tf =
            TransferFunction::new(vec![wn * wn], vec![1.0, 2.0 * zeta * wn, wn * wn]).unwrap();
        let opts = SimOptions {
            t_end: 6.0,
            n_points: 20_000,
            step_magnitude: 1.0,
        };
        let r = evaluate_step_response(&tf, &opts).unwrap();
        let expected = 100.0 * (-zeta * std::f64::consts::PI / (1.0 - zeta * zeta).sqrt()).exp();
        assert!((r.metrics.percent_overshoot - expected).abs() < 0.1);
    }

    #[test]
    fn steady_state_error_of_scaled_step() {
        // DC gain 0.5 with step 2 -> yss = 1, ess = 1
        let tf = TransferFunction::new(vec![0.5], vec![0.1, 1.0]).unwrap();
        let opts = SimOptions {
            step_magnitude: 2.0,
            ..SimOptions::default()
        };
        let r = evaluate_step_response(&tf, &opts).unwrap();
        assert!((r.metrics.steady_state_value - 1.0).abs() < 1e-9);
        assert!((r.metrics.steady_state_error - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_response_uses_fallbacks() {
        let m = compute_metrics(&traj(vec![0.0, 1.0, 2.0], vec![0.0, 0.0, 0.0]), 1.0).unwrap();
        assert_eq!(m.steady_state_value, 0.0);
        assert_eq!(m.percent_overshoot, 0.0);
        // Band of 0.02 around zero contains every sample
        assert_eq!(m.settling_time, 0.0);
        assert_eq!(m.steady_state_error, 1.0);
        assert!((m.integral_absolute_error - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missed_thresholds_are_infinite() {
        // Only the final sample lies inside the band.
        let m = compute_metrics(&traj(vec![0.0, 1.0, 2.0], vec![0.0, 5.0, -1.0]), 1.0).unwrap();
        assert_eq!(m.settling_time, 2.0);
        let nan = compute_metrics(&traj(vec![0.0, 1.0], vec![0.0, f64::NAN]), 1.0).unwrap();
        assert_eq!(nan.settling_time, f64::INFINITY);
        assert_eq!(nan.rise_time, f64::INFINITY);
        assert_eq!(nan.percent_overshoot, 0.0);
        assert!(!nan.is_finite());
    }

    #[test]
    fn oscillatory_rise_uses_first_crossing() {
        let t = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![0.0, 0.5, 1.5, 0.05, 0.95, 1.0];
        let m = compute_metrics(&traj(t, y), 1.0).unwrap();
        assert_eq!(m.rise_time, 1.0);
        assert!((m.percent_overshoot - 50.0).abs() < 1e-9);
    }

    #[test]
    fn options_are_validated() {
        let tf = TransferFunction::gain(1.0).unwrap();
        let bad = SimOptions {
            n_points: 1,
            ..SimOptions::default()
        };
        assert!(evaluate_step_response(&tf, &bad).is_err());
        let bad = SimOptions {
            t_end: 0.0,
            ..SimOptions::default()
        };
        assert!(evaluate_step_response(&tf, &bad).is_err());
    }
}
