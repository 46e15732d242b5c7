//! Bounded nonlinear least squares.
//!
//! Minimizes `0.5 * ||r(x)||^2` subject to `lower <= x <= upper` with a
//! projected Levenberg-Marquardt iteration:
//! - Jacobian from forward differences that stay inside the box
//! - Marquardt scaling `(J^T J + lambda diag(J^T J)) dx = -J^T r`
//! - trial points projected back onto the box
//! - damping adapted on success/failure of each trial

use nalgebra::{DMatrix, DVector};

use crate::bounds::Bounds;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;

/// Least-squares solver configuration.
#[derive(Debug, Clone)]
pub struct LeastSquaresConfig {
    /// Maximum outer iterations (Jacobian evaluations)
    pub max_iterations: usize,
    /// Relative step tolerance
    pub xtol: f64,
    /// Relative cost reduction tolerance
    pub ftol: f64,
    /// Projected gradient tolerance
    pub gtol: f64,
    /// Relative finite-difference step
    pub fd_epsilon: f64,
    /// Initial Marquardt damping
    pub initial_damping: f64,
    /// Damping multiplier after a rejected trial
    pub damping_increase: f64,
    /// Damping multiplier after an accepted trial
    pub damping_decrease: f64,
    /// Rejected trials allowed per iteration before giving up
    pub max_trials: usize,
}

impl Default for LeastSquaresConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            xtol: 1e-12,
            ftol: 1e-14,
            gtol: 1e-14,
            fd_epsilon: 1.5e-8,
            initial_damping: 1e-3,
            damping_increase: 10.0,
            damping_decrease: 0.3,
            max_trials: 30,
        }
    }
}

/// Least-squares result.
#[derive(Debug, Clone)]
pub struct LeastSquaresResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Residual vector at `x`
    pub residuals: DVector<f64>,
    /// `0.5 * ||r||^2` at `x`
    pub cost: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Number of residual evaluations (including Jacobian columns)
    pub evaluations: usize,
    /// A tolerance on step, cost reduction or projected gradient was met
    pub converged: bool,
    /// No trial step reduced the cost before a tolerance was met
    pub stalled: bool,
}

fn cost_of(r: &DVector<f64>) -> f64 {
    let c = 0.5 * r.norm_squared();
    if c.is_nan() { f64::INFINITY } else { c }
}

/// Gradient with components that point out of the box through an active bound removed.
fn projected_gradient(g: &DVector<f64>, x: &DVector<f64>, bounds: &Bounds) -> DVector<f64> {
    DVector::from_iterator(
        g.len(),
        (0..g.len()).map(|i| {
            let blocked_low = x[i] <= bounds.lower[i] && g[i] > 0.0;
            let blocked_high = x[i] >= bounds.upper[i] && g[i] < 0.0;
            if blocked_low || blocked_high { 0.0 } else { g[i] }
        }),
    )
}

fn solve_damped(jtj: &DMatrix<f64>, g: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        a[(i, i)] += lambda * jtj[(i, i)].max(1e-300);
    }
    let rhs = -g;
    match a.clone().cholesky() {
        Some(chol) => Some(chol.solve(&rhs)),
        None => a.lu().solve(&rhs),
    }
}

/// Bounded Levenberg-Marquardt.
///
/// The starting point is projected onto the box. Running out of iterations
/// is not an error: the best point found is returned with `converged = false`.
/// An iteration in which every damped trial is rejected ends the search with
/// `stalled = true` and `converged = false`.
pub fn least_squares<F>(
    residual_fn: F,
    x0: DVector<f64>,
    bounds: &Bounds,
    config: &LeastSquaresConfig,
) -> SolverResult<LeastSquaresResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    if x0.len() != bounds.dim() {
        return Err(SolverError::DimensionMismatch {
            what: "initial guess",
            expected: bounds.dim(),
            actual: x0.len(),
        });
    }
    if config.max_iterations == 0 || config.max_trials == 0 {
        return Err(SolverError::InvalidConfig {
            what: "max_iterations and max_trials must be positive".to_string(),
        });
    }

    let n = x0.len();
    let mut x = bounds.clamp(&x0);
    let mut r = residual_fn(&x)?;
    let mut cost = cost_of(&r);
    let mut evaluations = 1;
    let mut lambda = config.initial_damping;
    let mut converged = false;
    let mut stalled = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        if cost == 0.0 {
            converged = true;
            break;
        }
        iterations += 1;

        let jac =
            finite_difference_jacobian(&x, &r, &residual_fn, config.fd_epsilon, Some(bounds))?;
        evaluations += n;
        let g = jac.tr_mul(&r);
        let jtj = jac.tr_mul(&jac);

        if projected_gradient(&g, &x, bounds).amax() <= config.gtol * (1.0 + cost) {
            converged = true;
            break;
        }

        let mut accepted = false;
        for _ in 0..config.max_trials {
            let Some(dx) = solve_damped(&jtj, &g, lambda) else {
                lambda *= config.damping_increase;
                continue;
            };
            let x_new = bounds.clamp(&(&x + &dx));
            let step = &x_new - &x;
            if step.norm() <= config.xtol * (x.norm() + config.xtol) {
                converged = true;
                break;
            }

            let r_new = residual_fn(&x_new)?;
            evaluations += 1;
            let cost_new = cost_of(&r_new);

            if cost_new < cost {
                let reduction = (cost - cost_new) / cost;
                x = x_new;
                r = r_new;
                cost = cost_new;
                lambda = (lambda * config.damping_decrease).max(1e-15);
                accepted = true;
                if reduction <= config.ftol {
                    converged = true;
                }
                break;
            }
            lambda *= config.damping_increase;
        }

        tracing::trace!(iterations, cost, lambda, "least squares iteration");

        if converged {
            break;
        }
        if !accepted {
            stalled = true;
            break;
        }
    }

    if stalled {
        tracing::warn!(
            iterations,
            evaluations,
            cost,
            "least squares stalled, no trial step accepted"
        );
    } else if !converged {
        tracing::warn!(iterations, evaluations, cost, "least squares budget exhausted");
    }
    tracing::debug!(
        iterations,
        evaluations,
        cost,
        converged,
        stalled,
        "least squares finished"
    );

    Ok(LeastSquaresResult {
        x,
        residuals: r,
        cost,
        iterations,
        evaluations,
        converged,
        stalled,
    })
}
