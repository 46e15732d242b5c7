//! Grid, Nelder-Mead, Powell.
//!
//! Each stage hands only its best point to the next one. After each
//! refinement the gains are clamped to `[0, gain_limit]`.

use mt_controls::{PidGains, TransferFunction};
use mt_sim::{PerformanceMetrics, StepResponse};
use mt_solver::{grid_search, nelder_mead, powell};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{TuneError, TuneResult};
use crate::objective::TuningObjective;
use crate::options::TuneOptions;

/// Best score seen by each stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageScores {
    pub grid: f64,
    pub nelder_mead: f64,
    pub powell: f64,
    /// Score of the final clamped gains
    pub final_score: f64,
}

/// Tuned controller with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneOutcome {
    pub gains: PidGains,
    /// Grid-search winner, before refinement
    pub grid_gains: PidGains,
    pub closed_loop: TransferFunction,
    pub metrics: PerformanceMetrics,
    pub optimized: StepResponse,
    /// Same Kp with Ki = Kd = 0
    pub p_only: StepResponse,
    /// Same Kp, Ki with Kd = 0
    pub pi_only: StepResponse,
    pub scores: StageScores,
    pub evaluations: usize,
}

fn as_gains(x: &[f64]) -> TuneResult<[f64; 3]> {
    <[f64; 3]>::try_from(x).map_err(|_| TuneError::InvalidOption {
        what: format!("expected 3 gains, got {}", x.len()),
    })
}

fn clamp_gains(x: &DVector<f64>, limit: f64, stage: &'static str) -> TuneResult<[f64; 3]> {
    let k = as_gains(x.as_slice())?.map(|v| v.clamp(0.0, limit));
    if k.iter().any(|v| *v >= limit) {
        tracing::warn!(
            stage,
            kp = k[0],
            ki = k[1],
            kd = k[2],
            limit,
            "gain clamped at the upper limit; optimum may lie outside the search range"
        );
    }
    Ok(k)
}

/// Tune PID gains for `plant`.
pub fn tune(plant: &TransferFunction, options: &TuneOptions) -> TuneResult<TuneOutcome> {
    options.validate()?;
    let objective = TuningObjective::new(plant, options);
    let score = |x: &DVector<f64>| match as_gains(x.as_slice()) {
        Ok(k) => objective.evaluate(k),
        Err(_) => options.penalty,
    };

    let axes = options.grid_axes()?;
    let grid = grid_search(&axes, |p| match as_gains(p) {
        Ok(k) => objective.evaluate(k),
        Err(_) => options.penalty,
    })?;
    let grid_k = as_gains(&grid.point)?;
    tracing::debug!(
        kp = grid_k[0],
        ki = grid_k[1],
        kd = grid_k[2],
        score = grid.value,
        "grid winner"
    );

    let nm = nelder_mead(&score, DVector::from_row_slice(&grid_k), &options.nelder_mead)?;
    let nm_k = clamp_gains(&nm.x, options.gain_limit, "nelder-mead")?;
    tracing::debug!(
        kp = nm_k[0],
        ki = nm_k[1],
        kd = nm_k[2],
        score = nm.fun,
        "nelder-mead result"
    );

    let pw = powell(&score, DVector::from_row_slice(&nm_k), &options.powell)?;
    let k = clamp_gains(&pw.x, options.gain_limit, "powell")?;
    tracing::debug!(
        kp = k[0],
        ki = k[1],
        kd = k[2],
        score = pw.fun,
        "powell result"
    );

    let final_score = objective.evaluate(k);
    let gains = objective.gains(k);
    let closed_loop = objective.closed_loop(&gains)?;
    let optimized = objective.response(&gains)?;
    let p_only = objective.response(&gains.p_only())?;
    let pi_only = objective.response(&gains.pi_only())?;

    tracing::info!(
        kp = gains.kp,
        ki = gains.ki,
        kd = gains.kd,
        score = final_score,
        evaluations = objective.evaluations(),
        "tuned PID gains"
    );

    Ok(TuneOutcome {
        gains,
        grid_gains: objective.gains(grid_k),
        closed_loop,
        metrics: optimized.metrics,
        optimized,
        p_only,
        pi_only,
        scores: StageScores {
            grid: grid.value,
            nelder_mead: nm.fun,
            powell: pw.fun,
            final_score,
        },
        evaluations: objective.evaluations(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limits_each_gain() {
        let x = DVector::from_vec(vec![-1.0, 2e5, 3.0]);
        assert_eq!(clamp_gains(&x, 1e5, "test").unwrap(), [0.0, 1e5, 3.0]);
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        assert!(as_gains(&[1.0, 2.0]).is_err());
        assert_eq!(as_gains(&[1.0, 2.0, 3.0]).unwrap(), [1.0, 2.0, 3.0]);
    }
}
