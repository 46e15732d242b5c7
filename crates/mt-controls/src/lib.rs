//! Linear control primitives for motortune.
//!
//! This crate provides the Laplace-domain building blocks the rest of the
//! workspace composes: polynomial arithmetic, rational transfer functions,
//! the DC-motor plant model and the PID controller synthesizer.
//!
//! # Architecture
//!
//! - Polynomials are coefficient slices in descending powers of `s`
//! - [`TransferFunction`] is immutable; composition returns new values
//! - [`build_plant`] maps physical constants to a plant transfer function
//! - [`build_controller`] maps PID gains to a controller transfer function

pub mod controller;
pub mod error;
pub mod plant;
pub mod polynomial;
pub mod transfer_function;

pub use controller::{DerivativeFilter, PidGains, build_controller};
pub use error::{ControlError, ControlResult};
pub use plant::{MechanicalParam, MotorConstants, PlantParameters, build_plant};
pub use transfer_function::TransferFunction;
