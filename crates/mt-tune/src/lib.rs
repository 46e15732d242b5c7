//! PID auto-tuning for motortune.
//!
//! Gains are scored by a weighted sum of closed-loop step-response metrics
//! and searched in three stages: a coarse logarithmic grid, a Nelder-Mead
//! refinement and a Powell refinement.

pub mod error;
pub mod objective;
pub mod options;
pub mod pipeline;

pub use error::{TuneError, TuneResult};
pub use objective::{ScoreWeights, TuningObjective};
pub use options::{GridAxis, TuneOptions};
pub use pipeline::{StageScores, TuneOutcome, tune};
