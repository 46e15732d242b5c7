//! Scalar score of a PID candidate.

use std::sync::atomic::{AtomicUsize, Ordering};

use mt_controls::{PidGains, TransferFunction, build_controller};
use mt_sim::{PerformanceMetrics, StepResponse, evaluate_step_response};
use serde::{Deserialize, Serialize};

use crate::error::TuneResult;
use crate::options::TuneOptions;

/// Weights of the metric terms in the tuning score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub steady_state_error: f64,
    pub percent_overshoot: f64,
    pub rise_time: f64,
    pub settling_time: f64,
    pub integral_absolute_error: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            steady_state_error: 5.0,
            percent_overshoot: 0.05,
            rise_time: 0.3,
            settling_time: 0.2,
            integral_absolute_error: 0.5,
        }
    }
}

impl ScoreWeights {
    pub fn score(&self, m: &PerformanceMetrics) -> f64 {
        self.steady_state_error * m.steady_state_error
            + self.percent_overshoot * m.percent_overshoot
            + self.rise_time * m.rise_time
            + self.settling_time * m.settling_time
            + self.integral_absolute_error * m.integral_absolute_error
    }
}

/// Objective shared by every search stage for one plant.
///
/// Safe to evaluate from several threads; the evaluation counter is atomic.
pub struct TuningObjective<'a> {
    plant: &'a TransferFunction,
    options: &'a TuneOptions,
    evaluations: AtomicUsize,
}

impl<'a> TuningObjective<'a> {
    pub fn new(plant: &'a TransferFunction, options: &'a TuneOptions) -> Self {
        Self {
            plant,
            options,
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn gains(&self, k: [f64; 3]) -> PidGains {
        PidGains::new(k[0], k[1], k[2], self.options.filter)
    }

    /// Unity-feedback loop of the controller for `gains` around the plant.
    pub fn closed_loop(&self, gains: &PidGains) -> TuneResult<TransferFunction> {
        let controller = build_controller(gains)?;
        Ok(controller.series(self.plant)?.unity_feedback()?)
    }

    pub fn response(&self, gains: &PidGains) -> TuneResult<StepResponse> {
        let cl = self.closed_loop(gains)?;
        Ok(evaluate_step_response(&cl, &self.options.sim)?)
    }

    /// Score of `[Kp, Ki, Kd]` after clamping negative gains to zero.
    ///
    /// A non-finite gain, any failure or a non-finite score yields the
    /// configured penalty.
    pub fn evaluate(&self, k: [f64; 3]) -> f64 {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        if k.iter().any(|v| !v.is_finite()) {
            return self.options.penalty;
        }
        let gains = self.gains(k).clamped_non_negative();
        match self.response(&gains) {
            Ok(r) => {
                let score = self.options.weights.score(&r.metrics);
                if score.is_finite() { score } else { self.options.penalty }
            }
            Err(e) => {
                tracing::trace!(error = %e, ?k, "candidate rejected");
                self.options.penalty
            }
        }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_controls::{MotorConstants, PlantParameters, build_plant};

    fn plant() -> TransferFunction {
        build_plant(&PlantParameters::new(MotorConstants::default(), 0.01, 0.1, true)).unwrap()
    }

    #[test]
    fn score_is_weighted_sum() {
        let m = PerformanceMetrics {
            steady_state_value: 0.9,
            percent_overshoot: 10.0,
            settling_time: 2.0,
            rise_time: 1.0,
            steady_state_error: 0.1,
            integral_absolute_error: 0.4,
        };
        let s = ScoreWeights::default().score(&m);
        assert!((s - (0.5 + 0.5 + 0.3 + 0.4 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn negative_gains_are_clamped() {
        let g = plant();
        let opts = TuneOptions::default();
        let obj = TuningObjective::new(&g, &opts);
        assert_eq!(obj.evaluate([-5.0, 10.0, -1.0]), obj.evaluate([0.0, 10.0, 0.0]));
        assert_eq!(obj.evaluations(), 2);
    }

    #[test]
    fn non_finite_gains_score_the_penalty() {
        let g = plant();
        let opts = TuneOptions::default();
        let obj = TuningObjective::new(&g, &opts);
        assert_eq!(obj.evaluate([f64::NAN, 1.0, 1.0]), opts.penalty);
        assert_eq!(obj.evaluate([1.0, f64::INFINITY, 1.0]), opts.penalty);
        assert_eq!(obj.evaluate([1.0, 1.0, f64::NEG_INFINITY]), opts.penalty);
        assert_eq!(obj.evaluations(), 3);
    }

    #[test]
    fn zero_gains_score_open_loop_error() {
        // C = 0 keeps the output at rest: ess = 1 and IAE = t_end
        let g = plant();
        let opts = TuneOptions::default();
        let obj = TuningObjective::new(&g, &opts);
        let s = obj.evaluate([0.0, 0.0, 0.0]);
        assert!((s - (5.0 * 1.0 + 0.5 * 4.0)).abs() < 1e-9, "score {s}");
    }

    #[test]
    fn unstable_loop_scores_no_better_than_penalty() {
        // Inverting the plant turns the loop into positive feedback
        let g = plant().scaled(-1.0).unwrap();
        let opts = TuneOptions::default();
        let obj = TuningObjective::new(&g, &opts);
        assert!(obj.evaluate([500.0, 300.0, 0.0]) >= opts.penalty);
    }

    #[test]
    fn reasonable_pid_scores_finitely() {
        let g = plant();
        let opts = TuneOptions::default();
        let obj = TuningObjective::new(&g, &opts);
        let s = obj.evaluate([100.0, 200.0, 5.0]);
        assert!(s.is_finite() && s < opts.penalty);
    }
}
