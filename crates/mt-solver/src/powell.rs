//! Powell's conjugate direction method.

use nalgebra::{DMatrix, DVector};

use crate::MinimizeResult;
use crate::error::{SolverError, SolverResult};
use crate::line_search::{bracket, brent};

const BRACKET_ITERATIONS: usize = 1000;
const BRENT_ITERATIONS: usize = 500;

/// Powell configuration.
#[derive(Debug, Clone)]
pub struct PowellConfig {
    /// Maximum sweeps over the direction set
    pub max_iterations: usize,
    /// Maximum objective evaluations
    pub max_evaluations: usize,
    /// Line search tolerance (scaled by 100 for each line minimization)
    pub xtol: f64,
    /// Relative decrease per sweep accepted as converged
    pub ftol: f64,
}

impl Default for PowellConfig {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            max_evaluations: 20_000,
            xtol: 1e-3,
            ftol: 1e-3,
        }
    }
}

struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F: FnMut(&DVector<f64>) -> f64> Counted<F> {
    fn call(&mut self, x: &DVector<f64>) -> f64 {
        self.evaluations += 1;
        let v = (self.f)(x);
        if v.is_nan() { f64::INFINITY } else { v }
    }

    /// Minimize along `dir` from `x`; returns `(f, x_new, step)`.
    fn line_minimize(
        &mut self,
        x: &DVector<f64>,
        fx: f64,
        dir: &DVector<f64>,
        tol: f64,
    ) -> (f64, DVector<f64>, DVector<f64>) {
        let mut along = |alpha: f64| self.call(&(x + dir * alpha));
        let Ok(br) = bracket(&mut along, 0.0, 1.0, BRACKET_ITERATIONS) else {
            tracing::debug!("line bracket failed, keeping current point");
            return (fx, x.clone(), DVector::zeros(x.len()));
        };
        let min = brent(&mut along, &br, tol, BRENT_ITERATIONS);
        if min.fx < fx {
            let step = dir * min.x;
            (min.fx, x + &step, step)
        } else {
            (fx, x.clone(), DVector::zeros(x.len()))
        }
    }
}

/// Minimize `f` from `x0` with Powell's method, starting from the
/// coordinate directions.
pub fn powell<F>(f: F, x0: DVector<f64>, config: &PowellConfig) -> SolverResult<MinimizeResult>
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(SolverError::InvalidConfig {
            what: "powell needs at least one dimension".to_string(),
        });
    }

    let mut obj = Counted { f, evaluations: 0 };
    let line_tol = config.xtol * 100.0;
    let mut directions = DMatrix::<f64>::identity(n, n);
    let mut x = x0;
    let mut fval = obj.call(&x);
    let mut x_start = x.clone();
    let mut iterations = 0;
    let mut converged = false;

    loop {
        let fx = fval;
        let mut biggest = 0;
        let mut delta = 0.0;

        for i in 0..n {
            let dir = directions.column(i).into_owned();
            let before = fval;
            let (f_new, x_new, _) = obj.line_minimize(&x, fval, &dir, line_tol);
            fval = f_new;
            x = x_new;
            if before - fval > delta {
                delta = before - fval;
                biggest = i;
            }
        }
        iterations += 1;

        let bound = config.ftol * (fx.abs() + fval.abs()) + 1e-20;
        if 2.0 * (fx - fval) <= bound {
            converged = true;
            break;
        }
        if obj.evaluations >= config.max_evaluations || iterations >= config.max_iterations {
            break;
        }

        // Extrapolate along the net displacement of this sweep
        let net = &x - &x_start;
        let extrapolated = &x * 2.0 - &x_start;
        x_start = x.clone();
        let fx2 = obj.call(&extrapolated);

        if fx > fx2 {
            let mut t = 2.0 * (fx + fx2 - 2.0 * fval);
            let tmp = fx - fval - delta;
            t *= tmp * tmp;
            let tmp = fx - fx2;
            t -= delta * tmp * tmp;
            if t < 0.0 {
                let (f_new, x_new, step) = obj.line_minimize(&x, fval, &net, line_tol);
                fval = f_new;
                x = x_new;
                if step.iter().any(|v| *v != 0.0) {
                    let last = directions.column(n - 1).into_owned();
                    directions.set_column(biggest, &last);
                    directions.set_column(n - 1, &step);
                }
            }
        }
    }

    if !converged {
        tracing::warn!(
            iterations,
            evaluations = obj.evaluations,
            "powell budget exhausted"
        );
    }

    Ok(MinimizeResult {
        x,
        fun: fval,
        iterations,
        evaluations: obj.evaluations,
        converged,
    })
}
