//! Box constraints.

use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};

/// Per-coordinate `[lower, upper]` box.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> SolverResult<Self> {
        if lower.len() != upper.len() {
            return Err(SolverError::DimensionMismatch {
                what: "bounds",
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        if lower.iter().zip(&upper).any(|(lo, hi)| !(lo < hi)) {
            return Err(SolverError::InvalidConfig {
                what: "every lower bound must be strictly below its upper bound".to_string(),
            });
        }
        Ok(Self {
            lower: DVector::from_vec(lower),
            upper: DVector::from_vec(upper),
        })
    }

    /// The same `[lower, upper]` interval on every coordinate.
    pub fn uniform(dim: usize, lower: f64, upper: f64) -> SolverResult<Self> {
        Self::new(vec![lower; dim], vec![upper; dim])
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn contains(&self, x: &DVector<f64>) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
    }

    /// Project `x` onto the box.
    pub fn clamp(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            x.len(),
            x.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(v, (lo, hi))| v.clamp(*lo, *hi)),
        )
    }

    /// Indices where `x` sits exactly on a bound.
    pub fn active(&self, x: &DVector<f64>) -> Vec<usize> {
        (0..x.len())
            .filter(|&i| x[i] <= self.lower[i] || x[i] >= self.upper[i])
            .collect()
    }
}
