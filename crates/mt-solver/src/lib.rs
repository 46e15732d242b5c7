//! Derivative-free and least-squares optimizers for motortune.
//!
//! This crate provides the numerical engines behind identification and
//! tuning. Every optimizer is a pure function from a starting point and an
//! objective to a result; no state survives between calls.
//!
//! - [`least_squares`]: bounded Levenberg-Marquardt with finite-difference Jacobian
//! - [`nelder_mead`]: downhill simplex
//! - [`powell`]: direction-set search with Brent line minimization
//! - [`grid_search`]: exhaustive evaluation over a Cartesian grid

pub mod bounds;
pub mod error;
pub mod grid;
pub mod jacobian;
pub mod least_squares;
pub mod line_search;
pub mod nelder_mead;
pub mod powell;

pub use bounds::Bounds;
pub use error::{SolverError, SolverResult};
pub use grid::{GridResult, grid_search};
pub use least_squares::{LeastSquaresConfig, LeastSquaresResult, least_squares};
pub use nelder_mead::{NelderMeadConfig, nelder_mead};
pub use powell::{PowellConfig, powell};

use nalgebra::DVector;

/// Outcome of a scalar minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeResult {
    /// Best point found
    pub x: DVector<f64>,
    /// Objective value at `x`
    pub fun: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Number of objective evaluations
    pub evaluations: usize,
    /// Converged flag (false means the budget ran out first)
    pub converged: bool,
}
