//! Parameter identification for motortune.
//!
//! Fits the unknown rotor inertia `J` and viscous damping `b` of a DC motor
//! to a measured step response, and generates synthetic step data from a
//! known motor for testing and demos.

pub mod dataset;
pub mod error;
pub mod identify;
pub mod synthetic;

pub use dataset::IdentificationDataset;
pub use error::{IdentError, IdentResult};
pub use identify::{
    FitProblem, IdentificationConfig, IdentificationResult, RESIDUAL_PENALTY, identify,
};
pub use synthetic::{SyntheticConfig, synthesize};
