//! Exhaustive search over a Cartesian product of axes.

use rayon::prelude::*;

use crate::error::{SolverError, SolverResult};

/// Best grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
}

/// Grid point at flat index `k`; the last axis varies fastest.
fn point_at(axes: &[Vec<f64>], mut k: usize) -> Vec<f64> {
    let mut point = vec![0.0; axes.len()];
    for (slot, axis) in point.iter_mut().zip(axes).rev() {
        *slot = axis[k % axis.len()];
        k /= axis.len();
    }
    point
}

/// Evaluate `objective` on every combination of `axes` and return the best.
///
/// Points are evaluated in parallel, but the winner is chosen by scanning in
/// row-major order (first axis outermost) and replacing only on a strictly
/// smaller value, so ties go to the earliest point and the result does not
/// depend on thread scheduling. NaN values never win.
pub fn grid_search<F>(axes: &[Vec<f64>], objective: F) -> SolverResult<GridResult>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    if axes.is_empty() || axes.iter().any(Vec::is_empty) {
        return Err(SolverError::InvalidConfig {
            what: "grid search needs at least one non-empty axis".to_string(),
        });
    }

    let total: usize = axes.iter().map(Vec::len).product();
    let values: Vec<f64> = (0..total)
        .into_par_iter()
        .map(|k| objective(&point_at(axes, k)))
        .collect();

    let mut best = 0;
    for (k, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] || values[best].is_nan() {
            best = k;
        }
    }

    tracing::debug!(total, best_value = values[best], "grid search finished");

    Ok(GridResult {
        point: point_at(axes, best),
        value: values[best],
        evaluations: total,
    })
}
