//! Finite difference Jacobian computation.

use crate::bounds::Bounds;
use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by `epsilon * max(|x[j]|, 1e-3)` and
/// computes (f(x+e) - f(x))/e. With `bounds`, a step that would leave the
/// box is taken backwards instead, so `f` is only evaluated at feasible points.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: &F,
    epsilon: f64,
    bounds: Option<&Bounds>,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut dx = epsilon * x[j].abs().max(1e-3);
        if let Some(b) = bounds
            && x[j] + dx > b.upper[j]
        {
            dx = -dx;
        }

        let mut x_perturbed = x.clone();
        x_perturbed[j] += dx;
        let f_perturbed = f(&x_perturbed)?;
        let df = (f_perturbed - f_x) / dx;

        jac.set_column(j, &df);
    }

    Ok(jac)
}
