//! Time-domain simulation and step-response analysis for motortune.
//!
//! Provides:
//! - Controllable canonical state-space realization of transfer functions
//! - Exact zero-order-hold step simulation on arbitrary time grids
//! - Step-response performance metrics (overshoot, rise, settling, IAE)

pub mod error;
pub mod response;
pub mod simulate;
pub mod state_space;

pub use error::{SimError, SimResult};
pub use response::{
    PerformanceMetrics, SimOptions, StepResponse, compute_metrics, evaluate_step_response,
};
pub use simulate::{Trajectory, simulate_step};
pub use state_space::{Discretization, StateSpace};
