//! Least-squares identification of rotor inertia and damping.
//!
//! The model is the motor plant with the known electrical constants and a
//! candidate `(J, b)`, driven by the experiment's step voltage and sampled at
//! the dataset's own time points. The fit minimizes the squared difference
//! to the offset-corrected measurement inside the box
//! `J in [1e-7, 1]`, `b in [1e-7, 10]`.

use mt_controls::{MotorConstants, PlantParameters, build_plant};
use mt_sim::{Trajectory, simulate_step};
use mt_solver::{Bounds, LeastSquaresConfig, SolverResult, least_squares};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::dataset::IdentificationDataset;
use crate::error::{IdentError, IdentResult};

/// Residual reported for every sample when a candidate is infeasible.
pub const RESIDUAL_PENALTY: f64 = 1e6;

/// Identification settings.
#[derive(Debug, Clone)]
pub struct IdentificationConfig {
    /// Height of the voltage step applied in the experiment
    pub step_magnitude: f64,
    /// Starting `(J, b)`
    pub initial_guess: (f64, f64),
    /// Admissible `J` range
    pub j_bounds: (f64, f64),
    /// Admissible `b` range
    pub b_bounds: (f64, f64),
    pub solver: LeastSquaresConfig,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            step_magnitude: 1.0,
            initial_guess: (0.01, 0.1),
            j_bounds: (1e-7, 1.0),
            b_bounds: (1e-7, 10.0),
            solver: LeastSquaresConfig::default(),
        }
    }
}

/// Estimated mechanical parameters plus fit diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationResult {
    pub estimated_j: f64,
    pub estimated_b: f64,
    /// Root-mean-square error of the refit against the offset-corrected data
    pub rmse: f64,
    /// Model response at the estimate, on the dataset's time grid
    pub fitted: Trajectory,
    /// Offset-corrected measurement
    pub measured: Trajectory,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
    /// Estimate of `J` sits on a box bound
    pub j_at_bound: bool,
    /// Estimate of `b` sits on a box bound
    pub b_at_bound: bool,
}

/// Fitting problem for one dataset.
pub struct FitProblem<'a> {
    constants: MotorConstants,
    include_inductance: bool,
    step_magnitude: f64,
    times: &'a [f64],
    measured: Vec<f64>,
}

impl<'a> FitProblem<'a> {
    pub fn new(
        dataset: &'a IdentificationDataset,
        constants: MotorConstants,
        include_inductance: bool,
        step_magnitude: f64,
    ) -> Self {
        Self {
            constants,
            include_inductance,
            step_magnitude,
            times: dataset.times(),
            measured: dataset.offset_corrected(),
        }
    }

    pub fn measured(&self) -> &[f64] {
        &self.measured
    }

    /// Model step response for `(j, b)` at the dataset's time points.
    pub fn simulate(&self, j: f64, b: f64) -> IdentResult<Trajectory> {
        let params = PlantParameters::new(self.constants, j, b, self.include_inductance);
        let plant = build_plant(&params)?;
        Ok(simulate_step(&plant, self.step_magnitude, self.times)?)
    }

    /// Model minus measurement.
    ///
    /// Non-positive parameters, a failed simulation or a non-finite response
    /// all yield the constant [`RESIDUAL_PENALTY`] vector.
    pub fn residuals(&self, j: f64, b: f64) -> Vec<f64> {
        let penalty = || vec![RESIDUAL_PENALTY; self.measured.len()];
        if !(j > 0.0 && b > 0.0) {
            return penalty();
        }
        match self.simulate(j, b) {
            Ok(traj) if traj.is_finite() => traj
                .y
                .iter()
                .zip(&self.measured)
                .map(|(model, data)| model - data)
                .collect(),
            _ => penalty(),
        }
    }
}

fn rmse(a: &[f64], b: &[f64]) -> f64 {
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum / a.len() as f64).sqrt()
}

/// Estimate `(J, b)` from a measured step response.
pub fn identify(
    dataset: &IdentificationDataset,
    constants: MotorConstants,
    include_inductance: bool,
    config: &IdentificationConfig,
) -> IdentResult<IdentificationResult> {
    if !(config.step_magnitude.is_finite() && config.step_magnitude != 0.0) {
        return Err(IdentError::InvalidArg {
            what: "step magnitude must be finite and non-zero".to_string(),
        });
    }

    let problem = FitProblem::new(dataset, constants, include_inductance, config.step_magnitude);
    let bounds = Bounds::new(
        vec![config.j_bounds.0, config.b_bounds.0],
        vec![config.j_bounds.1, config.b_bounds.1],
    )?;
    let x0 = DVector::from_vec(vec![config.initial_guess.0, config.initial_guess.1]);

    let residual_fn = |theta: &DVector<f64>| -> SolverResult<DVector<f64>> {
        Ok(DVector::from_vec(problem.residuals(theta[0], theta[1])))
    };
    let fit = least_squares(residual_fn, x0, &bounds, &config.solver)?;

    let (j, b) = (fit.x[0], fit.x[1]);
    let fitted = problem.simulate(j, b)?;
    let rmse = rmse(&fitted.y, problem.measured());

    let active = bounds.active(&fit.x);
    let j_at_bound = active.contains(&0);
    let b_at_bound = active.contains(&1);
    if j_at_bound || b_at_bound {
        tracing::warn!(j, b, j_at_bound, b_at_bound, "identified parameter on its bound");
    }
    tracing::info!(j, b, rmse, iterations = fit.iterations, "identified mechanical parameters");

    Ok(IdentificationResult {
        estimated_j: j,
        estimated_b: b,
        rmse,
        fitted,
        measured: Trajectory {
            t: dataset.times().to_vec(),
            y: problem.measured().to_vec(),
        },
        iterations: fit.iterations,
        evaluations: fit.evaluations,
        converged: fit.converged,
        j_at_bound,
        b_at_bound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_dataset() -> IdentificationDataset {
        let t: Vec<f64> = (0..50).map(|i| i as f64 * 0.02).collect();
        let y = t.iter().map(|v| 3.0 + v).collect();
        IdentificationDataset::new(t, y).unwrap()
    }

    #[test]
    fn infeasible_candidates_get_constant_penalty() {
        let data = ramp_dataset();
        let problem = FitProblem::new(&data, MotorConstants::default(), true, 1.0);
        for (j, b) in [(0.0, 0.1), (0.01, -1.0), (-1.0, -1.0), (f64::NAN, 0.1)] {
            let r = problem.residuals(j, b);
            assert_eq!(r.len(), data.len());
            assert!(r.iter().all(|v| *v == RESIDUAL_PENALTY), "j={j} b={b}");
        }
    }

    #[test]
    fn residuals_use_offset_corrected_measurement() {
        let data = ramp_dataset();
        let problem = FitProblem::new(&data, MotorConstants::default(), true, 1.0);
        assert_eq!(problem.measured()[0], 0.0);
        let r = problem.residuals(0.01, 0.1);
        // Model starts at rest, corrected data starts at zero
        assert_eq!(r[0], 0.0);
        assert!(r.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_step_is_rejected() {
        let config = IdentificationConfig {
            step_magnitude: 0.0,
            ..IdentificationConfig::default()
        };
        let err = identify(&ramp_dataset(), MotorConstants::default(), true, &config).unwrap_err();
        assert!(matches!(err, IdentError::InvalidArg { .. }));
    }

    #[test]
    fn rmse_of_identical_series_is_zero() {
        assert_eq!(rmse(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert!((rmse(&[0.0, 0.0], &[3.0, 4.0]) - (12.5f64).sqrt()).abs() < 1e-12);
    }
}
