//! mt-core: stable foundation for motortune.
//!
//! Contains:
//! - numeric (Real + sample grids + trapezoid integration)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{MtError, MtResult};
pub use numeric::*;
