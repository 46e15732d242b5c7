//! Job validation logic.

use crate::schema::{DataSourceDef, JOB_VERSION, MotorJob, ParamDef, SyntheticDef, WeightsDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive and finite"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be non-negative and finite"))
    }
}

pub fn validate_job(job: &MotorJob) -> Result<(), ValidationError> {
    if job.version > JOB_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: job.version,
        });
    }

    let motor = &job.motor;
    positive("motor.r", motor.r)?;
    if motor.include_inductance {
        positive("motor.l", motor.l)?;
    } else {
        non_negative("motor.l", motor.l)?;
    }
    positive("motor.kt", motor.kt)?;
    positive("motor.ke", motor.ke)?;
    for (field, param) in [("motor.j", motor.j), ("motor.b", motor.b)] {
        if let ParamDef::Known { value } = param {
            positive(field, value)?;
        }
    }

    let sim = &job.simulation;
    if !sim.step_magnitude.is_finite() || sim.step_magnitude == 0.0 {
        return Err(invalid(
            "simulation.step_magnitude",
            sim.step_magnitude,
            "must be finite and non-zero",
        ));
    }
    positive("simulation.t_end", sim.t_end)?;
    if sim.n_points < 2 {
        return Err(invalid("simulation.n_points", sim.n_points, "must be at least 2"));
    }

    if job.controller.derivative_filter {
        positive(
            "controller.filter_time_constant",
            job.controller.filter_time_constant,
        )?;
    }

    if let Some(w) = &job.weights {
        validate_weights(w)?;
    }

    match &job.data {
        Some(source) => validate_source(source)?,
        None if job.needs_identification() => {
            return Err(invalid(
                "data",
                "none",
                "a data source is required when J or b is unknown",
            ));
        }
        None => {}
    }

    Ok(())
}

fn validate_weights(w: &WeightsDef) -> Result<(), ValidationError> {
    non_negative("weights.ess", w.ess)?;
    non_negative("weights.overshoot", w.overshoot)?;
    non_negative("weights.rise_time", w.rise_time)?;
    non_negative("weights.settling_time", w.settling_time)?;
    non_negative("weights.iae", w.iae)?;
    Ok(())
}

fn validate_source(source: &DataSourceDef) -> Result<(), ValidationError> {
    match source {
        DataSourceDef::Csv(path) if path.trim().is_empty() => {
            Err(invalid("data.csv", "\"\"", "path must not be empty"))
        }
        DataSourceDef::Csv(_) => Ok(()),
        DataSourceDef::Synthetic(def) => validate_synthetic(def),
    }
}

fn validate_synthetic(def: &SyntheticDef) -> Result<(), ValidationError> {
    positive("data.synthetic.j_true", def.j_true)?;
    positive("data.synthetic.b_true", def.b_true)?;
    positive("data.synthetic.t_end", def.t_end)?;
    positive("data.synthetic.dt", def.dt)?;
    if def.dt > def.t_end {
        return Err(invalid(
            "data.synthetic.dt",
            def.dt,
            "must not exceed data.synthetic.t_end",
        ));
    }
    non_negative("data.synthetic.noise_std", def.noise_std)?;
    Ok(())
}
