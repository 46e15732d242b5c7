//! Step simulation on arbitrary time grids.

use mt_controls::TransferFunction;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::state_space::{Discretization, StateSpace};

/// Relative change in step length that forces a new discretization.
const STEP_REUSE_REL_TOL: f64 = 1e-9;

/// Sampled `(time, output)` trajectory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Output samples
    pub y: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Last output sample.
    pub fn last_output(&self) -> Option<f64> {
        self.y.last().copied()
    }

    /// True when every output sample is finite.
    pub fn is_finite(&self) -> bool {
        self.y.iter().all(|v| v.is_finite())
    }
}

/// Response of `tf` to a step of height `magnitude` applied at `times[0]`.
///
/// The state starts at rest at `times[0]`; outputs are reported at exactly
/// the requested instants. An unstable system yields growing or non-finite
/// samples rather than an error.
pub fn simulate_step(
    tf: &TransferFunction,
    magnitude: f64,
    times: &[f64],
) -> SimResult<Trajectory> {
    if times.is_empty() {
        return Err(SimError::InvalidArg {
            what: "time grid must not be empty",
        });
    }
    if !mt_core::is_strictly_increasing(times) {
        return Err(SimError::NonMonotonicTime);
    }

    let ss = StateSpace::from_transfer_function(tf)?;
    let u = magnitude;
    let mut x = DVector::zeros(ss.order());
    let mut next = DVector::zeros(ss.order());
    let mut zoh: Option<Discretization> = None;

    let mut y = Vec::with_capacity(times.len());
    y.push(ss.c.dot(&x) + ss.d * u);

    for w in times.windows(2) {
        let h = w[1] - w[0];
        let reuse = zoh
            .as_ref()
            .is_some_and(|z| (z.h - h).abs() <= STEP_REUSE_REL_TOL * h);
        if !reuse {
            zoh = Some(ss.discretize(h)?);
        }
        if let Some(z) = zoh.as_ref() {
            // next = Ad x + Bd u
            next.copy_from(&z.bd);
            next.gemv(1.0, &z.ad, &x, u);
            std::mem::swap(&mut x, &mut next);
        }
        y.push(ss.c.dot(&x) + ss.d * u);
    }

    Ok(Trajectory {
        t: times.to_vec(),
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_core::linspace;

    #[test]
    fn first_order_matches_closed_form() {
        // 1/(tau s + 1), y = K (1 - e^{-t/tau})
        let tau = 0.5;
        let tf = TransferFunction::new(vec![1.0], vec![tau, 1.0]).unwrap();
        let t = linspace(0.0, 3.0, 301);
        let traj = simulate_step(&tf, 2.0, &t).unwrap();
        for (ti, yi) in traj.t.iter().zip(&traj.y) {
            let exact = 2.0 * (1.0 - (-ti / tau).exp());
            assert!((yi - exact).abs() < 1e-10, "t={ti}: {yi} vs {exact}");
        }
    }

    #[test]
    fn second_order_matches_closed_form() {
        // 1/((s+1)(s+2)) -> y = 1/2 - e^-t + e^-2t / 2
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 3.0, 2.0]).unwrap();
        let t = linspace(0.0, 5.0, 101);
        let traj = simulate_step(&tf, 1.0, &t).unwrap();
        for (ti, yi) in traj.t.iter().zip(&traj.y) {
            let exact = 0.5 - (-ti).exp() + 0.5 * (-2.0 * ti).exp();
            assert!((yi - exact).abs() < 1e-10);
        }
    }

    #[test]
    fn non_uniform_grid_is_exact() {
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 1.0]).unwrap();
        let t = vec![0.0, 0.01, 0.05, 0.3, 0.31, 1.7];
        let traj = simulate_step(&tf, 1.0, &t).unwrap();
        for (ti, yi) in traj.t.iter().zip(&traj.y) {
            assert!((yi - (1.0 - (-ti).exp())).abs() < 1e-12);
        }
    }

    #[test]
    fn feedthrough_appears_at_first_sample() {
        let tf = TransferFunction::new(vec![1.0, 1.0], vec![1.0, 2.0]).unwrap();
        let traj = simulate_step(&tf, 3.0, &[0.0, 1.0]).unwrap();
        assert_eq!(traj.y[0], 3.0);
    }

    #[test]
    fn unstable_system_does_not_error() {
        // 1/(s - 50)
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -50.0]).unwrap();
        let t = linspace(0.0, 20.0, 200);
        let traj = simulate_step(&tf, 1.0, &t).unwrap();
        assert!(traj.y.last().unwrap().abs() > 1e100 || !traj.is_finite());
    }

    #[test]
    fn rejects_bad_grids() {
        let tf = TransferFunction::gain(1.0).unwrap();
        assert!(simulate_step(&tf, 1.0, &[]).is_err());
        assert_eq!(
            simulate_step(&tf, 1.0, &[0.0, 0.0]),
            Err(SimError::NonMonotonicTime)
        );
    }
}
