//! Tuning options.

use mt_controls::DerivativeFilter;
use mt_sim::SimOptions;
use mt_solver::{NelderMeadConfig, PowellConfig};
use serde::{Deserialize, Serialize};

use crate::error::{TuneError, TuneResult};
use crate::objective::ScoreWeights;

/// Logarithmically spaced grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl GridAxis {
    pub fn new(start: f64, end: f64, points: usize) -> Self {
        Self { start, end, points }
    }

    pub fn values(&self) -> TuneResult<Vec<f64>> {
        if self.points == 0 {
            return Err(TuneError::InvalidOption {
                what: "grid axis needs at least one point".to_string(),
            });
        }
        Ok(mt_core::geomspace(self.start, self.end, self.points)?)
    }
}

/// Everything the tuner needs besides the plant.
#[derive(Debug, Clone)]
pub struct TuneOptions {
    pub sim: SimOptions,
    pub filter: DerivativeFilter,
    pub weights: ScoreWeights,
    pub kp_axis: GridAxis,
    pub ki_axis: GridAxis,
    pub kd_axis: GridAxis,
    pub nelder_mead: NelderMeadConfig,
    pub powell: PowellConfig,
    /// Upper clamp applied to every gain after each refinement stage
    pub gain_limit: f64,
    /// Score assigned to candidates that cannot be evaluated
    pub penalty: f64,
}

impl Default for TuneOptions {
    fn default() -> Self {
        Self {
            sim: SimOptions::default(),
            filter: DerivativeFilter::default(),
            weights: ScoreWeights::default(),
            kp_axis: GridAxis::new(5.0, 500.0, 6),
            ki_axis: GridAxis::new(1.0, 300.0, 6),
            kd_axis: GridAxis::new(0.1, 50.0, 5),
            nelder_mead: NelderMeadConfig::default(),
            powell: PowellConfig::default(),
            gain_limit: 1e5,
            penalty: 1e9,
        }
    }
}

impl TuneOptions {
    pub fn validate(&self) -> TuneResult<()> {
        self.sim.validate()?;
        if self.filter.enabled && !(self.filter.time_constant > 0.0) {
            return Err(TuneError::InvalidOption {
                what: format!(
                    "derivative filter time constant must be positive, got {}",
                    self.filter.time_constant
                ),
            });
        }
        if !(self.gain_limit > 0.0) {
            return Err(TuneError::InvalidOption {
                what: format!("gain limit must be positive, got {}", self.gain_limit),
            });
        }
        if !self.penalty.is_finite() {
            return Err(TuneError::InvalidOption {
                what: "penalty must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Kp, Ki and Kd axes in search order.
    pub fn grid_axes(&self) -> TuneResult<Vec<Vec<f64>>> {
        Ok(vec![
            self.kp_axis.values()?,
            self.ki_axis.values()?,
            self.kd_axis.values()?,
        ])
    }
}
