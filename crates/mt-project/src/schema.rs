//! Job file schema definitions.

use serde::{Deserialize, Serialize};

pub const JOB_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorJob {
    pub version: u32,
    pub name: String,
    pub motor: MotorDef,
    #[serde(default)]
    pub simulation: SimulationDef,
    #[serde(default)]
    pub controller: ControllerDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightsDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataSourceDef>,
}

impl MotorJob {
    /// True when `J` or `b` must be identified from data.
    pub fn needs_identification(&self) -> bool {
        self.motor.j.is_unknown() || self.motor.b.is_unknown()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorDef {
    pub r: f64,
    pub l: f64,
    pub kt: f64,
    pub ke: f64,
    pub j: ParamDef,
    pub b: ParamDef,
    #[serde(default = "default_true")]
    pub include_inductance: bool,
}

/// Mechanical parameter as written in a job file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamDef {
    Known { value: f64 },
    Unknown,
}

impl ParamDef {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ParamDef::Unknown)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationDef {
    pub step_magnitude: f64,
    pub t_end: f64,
    pub n_points: usize,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            step_magnitude: 1.0,
            t_end: 4.0,
            n_points: 1600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerDef {
    pub derivative_filter: bool,
    pub filter_time_constant: f64,
}

impl Default for ControllerDef {
    fn default() -> Self {
        Self {
            derivative_filter: true,
            filter_time_constant: 0.01,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightsDef {
    pub ess: f64,
    pub overshoot: f64,
    pub rise_time: f64,
    pub settling_time: f64,
    pub iae: f64,
}

impl Default for WeightsDef {
    fn default() -> Self {
        Self {
            ess: 5.0,
            overshoot: 0.05,
            rise_time: 0.3,
            settling_time: 0.2,
            iae: 0.5,
        }
    }
}

/// Where identification data comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceDef {
    /// Header-less `t,omega` CSV; relative paths resolve against the job file
    Csv(String),
    Synthetic(SyntheticDef),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyntheticDef {
    pub j_true: f64,
    pub b_true: f64,
    pub t_end: f64,
    pub dt: f64,
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SyntheticDef {
    fn default() -> Self {
        Self {
            j_true: 0.01,
            b_true: 0.1,
            t_end: 3.0,
            dt: 0.01,
            noise_std: 0.0,
            seed: 0,
        }
    }
}
