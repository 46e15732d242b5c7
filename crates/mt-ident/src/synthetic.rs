//! Synthetic step-response data from a known motor.

use mt_controls::{MotorConstants, PlantParameters, build_plant};
use mt_sim::simulate_step;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::dataset::IdentificationDataset;
use crate::error::{IdentError, IdentResult};

/// Slack added to `t_end` so the final sample is included.
const END_SLACK: f64 = 1e-12;

/// True mechanical parameters and sampling of a simulated experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub j_true: f64,
    pub b_true: f64,
    pub step_magnitude: f64,
    /// Experiment length (s)
    pub t_end: f64,
    /// Sampling interval (s)
    pub dt: f64,
    /// Standard deviation of additive Gaussian noise; 0 gives exact samples
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            j_true: 0.01,
            b_true: 0.1,
            step_magnitude: 1.0,
            t_end: 3.0,
            dt: 0.01,
            noise_std: 0.0,
            seed: 0,
        }
    }
}

/// Simulate the step response of the motor with `config`'s true `(J, b)`,
/// sampled at `0, dt, 2 dt, ...` through `t_end` inclusive.
pub fn synthesize(
    constants: MotorConstants,
    include_inductance: bool,
    config: &SyntheticConfig,
) -> IdentResult<IdentificationDataset> {
    if !(config.t_end > 0.0) {
        return Err(IdentError::InvalidArg {
            what: format!("t_end must be positive, got {}", config.t_end),
        });
    }
    if !(config.noise_std >= 0.0) || !config.noise_std.is_finite() {
        return Err(IdentError::InvalidArg {
            what: format!("noise_std must be non-negative, got {}", config.noise_std),
        });
    }

    let t = mt_core::arange(0.0, config.t_end + END_SLACK, config.dt)?;
    let params = PlantParameters::new(constants, config.j_true, config.b_true, include_inductance);
    let plant = build_plant(&params)?;
    let mut y = simulate_step(&plant, config.step_magnitude, &t)?.y;

    if config.noise_std > 0.0 {
        let normal = Normal::new(0.0, config.noise_std).map_err(|e| IdentError::InvalidArg {
            what: format!("noise distribution: {e}"),
        })?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        for v in &mut y {
            *v += normal.sample(&mut rng);
        }
    }

    tracing::debug!(
        samples = t.len(),
        dt = config.dt,
        noise_std = config.noise_std,
        "synthesized step data"
    );
    IdentificationDataset::new(t, y)
}
