//! Job loading and translation into library configuration.

use std::path::{Path, PathBuf};

use mt_controls::{DerivativeFilter, MechanicalParam, MotorConstants};
use mt_ident::{IdentificationConfig, SyntheticConfig};
use mt_project::schema::{MotorJob, ParamDef, SyntheticDef, WeightsDef};
use mt_sim::SimOptions;
use mt_tune::{ScoreWeights, TuneOptions};

use crate::error::AppResult;

/// Load and validate a YAML or JSON job file.
pub fn load_job(path: &Path) -> AppResult<MotorJob> {
    Ok(mt_project::load_job(path)?)
}

pub fn validate_job(job: &MotorJob) -> AppResult<()> {
    mt_project::validate_job(job).map_err(mt_project::ProjectError::from)?;
    Ok(())
}

pub fn motor_constants(job: &MotorJob) -> MotorConstants {
    MotorConstants {
        r: job.motor.r,
        l: job.motor.l,
        kt: job.motor.kt,
        ke: job.motor.ke,
    }
}

pub fn mechanical_param(def: ParamDef) -> MechanicalParam {
    match def {
        ParamDef::Known { value } => MechanicalParam::known(value),
        ParamDef::Unknown => MechanicalParam::Unknown,
    }
}

pub fn derivative_filter(job: &MotorJob) -> DerivativeFilter {
    DerivativeFilter {
        enabled: job.controller.derivative_filter,
        time_constant: job.controller.filter_time_constant,
    }
}

pub fn sim_options(job: &MotorJob) -> SimOptions {
    SimOptions {
        step_magnitude: job.simulation.step_magnitude,
        t_end: job.simulation.t_end,
        n_points: job.simulation.n_points,
    }
}

pub fn score_weights(def: &WeightsDef) -> ScoreWeights {
    ScoreWeights {
        steady_state_error: def.ess,
        percent_overshoot: def.overshoot,
        rise_time: def.rise_time,
        settling_time: def.settling_time,
        integral_absolute_error: def.iae,
    }
}

/// Tuner options for `job`, library defaults for everything the job omits.
pub fn tune_options(job: &MotorJob) -> TuneOptions {
    TuneOptions {
        sim: sim_options(job),
        filter: derivative_filter(job),
        weights: job.weights.as_ref().map(score_weights).unwrap_or_default(),
        ..TuneOptions::default()
    }
}

/// Identification uses the job's step magnitude as the experiment input.
pub fn identification_config(job: &MotorJob) -> IdentificationConfig {
    IdentificationConfig {
        step_magnitude: job.simulation.step_magnitude,
        ..IdentificationConfig::default()
    }
}

pub fn synthetic_config(job: &MotorJob, def: &SyntheticDef) -> SyntheticConfig {
    SyntheticConfig {
        j_true: def.j_true,
        b_true: def.b_true,
        step_magnitude: job.simulation.step_magnitude,
        t_end: def.t_end,
        dt: def.dt,
        noise_std: def.noise_std,
        seed: def.seed,
    }
}

/// Relative dataset paths are taken from the job file's directory.
pub fn resolve_data_path(job_path: &Path, data_path: &str) -> PathBuf {
    let p = Path::new(data_path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    job_path
        .parent()
        .map(|dir| dir.join(p))
        .unwrap_or_else(|| p.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_project::schema::*;

    fn job() -> MotorJob {
        MotorJob {
            version: JOB_VERSION,
            name: "t".to_string(),
            motor: MotorDef {
                r: 2.0,
                l: 0.1,
                kt: 0.05,
                ke: 0.04,
                j: ParamDef::Unknown,
                b: ParamDef::Known { value: 0.3 },
                include_inductance: true,
            },
            simulation: SimulationDef {
                step_magnitude: 12.0,
                ..SimulationDef::default()
            },
            controller: ControllerDef::default(),
            weights: None,
            data: None,
        }
    }

    #[test]
    fn maps_job_onto_library_types() {
        let job = job();
        let c = motor_constants(&job);
        assert_eq!((c.r, c.l, c.kt, c.ke), (2.0, 0.1, 0.05, 0.04));
        assert!(mechanical_param(job.motor.j).is_unknown());
        assert_eq!(mechanical_param(job.motor.b), MechanicalParam::known(0.3));

        let opts = tune_options(&job);
        assert_eq!(opts.sim.step_magnitude, 12.0);
        assert_eq!(opts.weights, ScoreWeights::default());
        assert!(opts.filter.enabled);
        assert_eq!(identification_config(&job).step_magnitude, 12.0);
    }

    #[test]
    fn custom_weights_are_used() {
        let mut job = job();
        job.weights = Some(WeightsDef {
            overshoot: 1.0,
            ..WeightsDef::default()
        });
        assert_eq!(tune_options(&job).weights.percent_overshoot, 1.0);
    }

    #[test]
    fn relative_data_paths_follow_the_job_file() {
        let p = resolve_data_path(Path::new("/jobs/motor.yaml"), "data/step.csv");
        assert_eq!(p, PathBuf::from("/jobs/data/step.csv"));
        let abs = resolve_data_path(Path::new("/jobs/motor.yaml"), "/tmp/step.csv");
        assert_eq!(abs, PathBuf::from("/tmp/step.csv"));
    }
}
