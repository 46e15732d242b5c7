//! Measured step-response samples.

use mt_sim::Trajectory;

use crate::error::{IdentError, IdentResult};

/// Ordered `(time, angular velocity)` samples of a step experiment.
///
/// Construction guarantees at least two samples, strictly increasing time
/// and finite values. The stored output is the raw measurement; the offset
/// correction is applied by [`IdentificationDataset::offset_corrected`].
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationDataset {
    t: Vec<f64>,
    y: Vec<f64>,
}

impl IdentificationDataset {
    pub fn new(t: Vec<f64>, y: Vec<f64>) -> IdentResult<Self> {
        if t.len() != y.len() {
            return Err(IdentError::MalformedData {
                what: format!("{} time samples but {} output samples", t.len(), y.len()),
            });
        }
        if t.len() < 2 {
            return Err(IdentError::InsufficientData {
                what: format!("need at least 2 samples, got {}", t.len()),
            });
        }
        if let Some(i) = t.iter().zip(&y).position(|(a, b)| !a.is_finite() || !b.is_finite()) {
            return Err(IdentError::MalformedData {
                what: format!("non-finite value in sample {i}"),
            });
        }
        if let Some(i) = t.windows(2).position(|w| w[1] <= w[0]) {
            return Err(IdentError::MalformedData {
                what: format!("time is not strictly increasing at sample {}", i + 1),
            });
        }
        Ok(Self { t, y })
    }

    /// Build from table rows; the first two columns are time and output,
    /// further columns are ignored.
    pub fn from_rows(rows: &[Vec<f64>]) -> IdentResult<Self> {
        if rows.is_empty() {
            return Err(IdentError::InsufficientData {
                what: "dataset has no rows".to_string(),
            });
        }
        let mut t = Vec::with_capacity(rows.len());
        let mut y = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let [ti, yi, ..] = row.as_slice() else {
                return Err(IdentError::MalformedData {
                    what: format!(
                        "row {} has {} column(s), expected 2 (t, omega)",
                        i + 1,
                        row.len()
                    ),
                });
            };
            t.push(*ti);
            y.push(*yi);
        }
        Self::new(t, y)
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.t
    }

    pub fn output(&self) -> &[f64] {
        &self.y
    }

    /// Output with the first sample subtracted.
    pub fn offset_corrected(&self) -> Vec<f64> {
        let y0 = self.y[0];
        self.y.iter().map(|v| v - y0).collect()
    }

    /// Raw samples as a trajectory.
    pub fn to_trajectory(&self) -> Trajectory {
        Trajectory {
            t: self.t.clone(),
            y: self.y.clone(),
        }
    }

    /// Rows in `(t, omega)` order, for writing back out.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.t.iter().copied().zip(self.y.iter().copied())
    }
}
