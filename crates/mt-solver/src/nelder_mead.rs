//! Nelder-Mead downhill simplex.

use nalgebra::DVector;

use crate::MinimizeResult;
use crate::error::{SolverError, SolverResult};

const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Nelder-Mead configuration.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Maximum objective evaluations
    pub max_evaluations: usize,
    /// Absolute spread of simplex vertices accepted as converged
    pub xatol: f64,
    /// Absolute spread of objective values accepted as converged
    pub fatol: f64,
    /// Relative perturbation for the initial simplex
    pub initial_step: f64,
    /// Perturbation used for coordinates that start at zero
    pub zero_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            max_evaluations: 20_000,
            xatol: 1e-3,
            fatol: 1e-3,
            initial_step: 0.05,
            zero_step: 0.00025,
        }
    }
}

struct Simplex {
    points: Vec<DVector<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&i, &j| self.values[i].total_cmp(&self.values[j]));
        self.points = order.iter().map(|&i| self.points[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn converged(&self, xatol: f64, fatol: f64) -> bool {
        let best = &self.points[0];
        let x_spread = self.points[1..]
            .iter()
            .map(|p| (p - best).amax())
            .fold(0.0, f64::max);
        let f_spread = self.values[1..]
            .iter()
            .map(|v| (v - self.values[0]).abs())
            .fold(0.0, f64::max);
        x_spread <= xatol && f_spread <= fatol
    }
}

/// Minimize `f` starting from `x0` with the downhill simplex method.
///
/// Non-convergence within the budget is reported through
/// `MinimizeResult::converged`, never as an error.
pub fn nelder_mead<F>(
    mut f: F,
    x0: DVector<f64>,
    config: &NelderMeadConfig,
) -> SolverResult<MinimizeResult>
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(SolverError::InvalidConfig {
            what: "nelder_mead needs at least one dimension".to_string(),
        });
    }

    let mut evaluations = 0;
    let mut eval = |x: &DVector<f64>, evaluations: &mut usize| {
        *evaluations += 1;
        let v = f(x);
        if v.is_nan() { f64::INFINITY } else { v }
    };

    let mut points = Vec::with_capacity(n + 1);
    points.push(x0.clone());
    for k in 0..n {
        let mut y = x0.clone();
        if y[k] != 0.0 {
            y[k] *= 1.0 + config.initial_step;
        } else {
            y[k] = config.zero_step;
        }
        points.push(y);
    }
    let values = points.iter().map(|p| eval(p, &mut evaluations)).collect();
    let mut simplex = Simplex { points, values };
    simplex.sort();

    let mut iterations = 1;
    let mut converged = false;

    while evaluations < config.max_evaluations && iterations < config.max_iterations {
        if simplex.converged(config.xatol, config.fatol) {
            converged = true;
            break;
        }

        let worst = simplex.points[n].clone();
        let f_worst = simplex.values[n];
        let centroid = simplex.points[..n]
            .iter()
            .fold(DVector::zeros(n), |acc, p| acc + p)
            / n as f64;

        let xr = &centroid * (1.0 + RHO) - &worst * RHO;
        let fxr = eval(&xr, &mut evaluations);
        let mut shrink = false;

        if fxr < simplex.values[0] {
            let xe = &centroid * (1.0 + RHO * CHI) - &worst * (RHO * CHI);
            let fxe = eval(&xe, &mut evaluations);
            if fxe < fxr {
                simplex.points[n] = xe;
                simplex.values[n] = fxe;
            } else {
                simplex.points[n] = xr;
                simplex.values[n] = fxr;
            }
        } else if fxr < simplex.values[n - 1] {
            simplex.points[n] = xr;
            simplex.values[n] = fxr;
        } else if fxr < f_worst {
            // Outside contraction
            let xc = &centroid * (1.0 + PSI * RHO) - &worst * (PSI * RHO);
            let fxc = eval(&xc, &mut evaluations);
            if fxc <= fxr {
                simplex.points[n] = xc;
                simplex.values[n] = fxc;
            } else {
                shrink = true;
            }
        } else {
            // Inside contraction
            let xcc = &centroid * (1.0 - PSI) + &worst * PSI;
            let fxcc = eval(&xcc, &mut evaluations);
            if fxcc < f_worst {
                simplex.points[n] = xcc;
                simplex.values[n] = fxcc;
            } else {
                shrink = true;
            }
        }

        if shrink {
            let best = simplex.points[0].clone();
            for j in 1..=n {
                let p = &best + (&simplex.points[j] - &best) * SIGMA;
                simplex.values[j] = eval(&p, &mut evaluations);
                simplex.points[j] = p;
            }
        }

        iterations += 1;
        simplex.sort();
    }

    if !converged {
        converged = simplex.converged(config.xatol, config.fatol);
    }
    if !converged {
        tracing::warn!(iterations, evaluations, "nelder-mead budget exhausted");
    }

    Ok(MinimizeResult {
        x: simplex.points[0].clone(),
        fun: simplex.values[0],
        iterations,
        evaluations,
        converged,
    })
}
