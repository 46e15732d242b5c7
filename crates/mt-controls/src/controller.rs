//! PID controller synthesis.
//!
//! Produces the continuous-time controller
//!
//! ```text
//! C(s) = Kp + Ki/s + Kd s
//! ```
//!
//! or, with the derivative filter enabled and `Kd > 0`,
//!
//! ```text
//! C(s) = Kp + Ki/s + Kd s / (1 + s Tf)
//! ```
//!
//! The filter bounds the high-frequency gain of the derivative path.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::transfer_function::TransferFunction;

/// First-order low-pass applied to the derivative term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivativeFilter {
    /// Whether the derivative path is filtered.
    pub enabled: bool,
    /// Filter time constant Tf (seconds). Must be positive when enabled.
    pub time_constant: f64,
}

impl Default for DerivativeFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            time_constant: 0.01,
        }
    }
}

impl DerivativeFilter {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// PID gains plus derivative filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Derivative filter configuration.
    pub filter: DerivativeFilter,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64, filter: DerivativeFilter) -> Self {
        Self { kp, ki, kd, filter }
    }

    /// Gains as a `[Kp, Ki, Kd]` array.
    pub fn as_array(&self) -> [f64; 3] {
        [self.kp, self.ki, self.kd]
    }

    /// Same filter settings with new gains taken from `[Kp, Ki, Kd]`.
    pub fn with_array(&self, k: [f64; 3]) -> Self {
        Self {
            kp: k[0],
            ki: k[1],
            kd: k[2],
            filter: self.filter,
        }
    }

    /// Negative gains replaced by zero.
    pub fn clamped_non_negative(&self) -> Self {
        self.with_array(self.as_array().map(|k| k.max(0.0)))
    }

    /// Proportional-only variant (Ki = Kd = 0).
    pub fn p_only(&self) -> Self {
        self.with_array([self.kp, 0.0, 0.0])
    }

    /// Proportional-integral variant (Kd = 0).
    pub fn pi_only(&self) -> Self {
        self.with_array([self.kp, self.ki, 0.0])
    }
}

/// Build the controller transfer function for `gains`.
pub fn build_controller(gains: &PidGains) -> ControlResult<TransferFunction> {
    let PidGains { kp, ki, kd, filter } = *gains;
    if filter.enabled && kd > 0.0 {
        if !(filter.time_constant > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "derivative filter time constant must be positive",
            });
        }
        // Kd s / (Tf s + 1) + (Kp s + Ki) / s
        let derivative = TransferFunction::new(vec![kd, 0.0], vec![filter.time_constant, 1.0])?;
        let proportional_integral = TransferFunction::new(vec![kp, ki], vec![1.0, 0.0])?;
        derivative.parallel(&proportional_integral)
    } else {
        // (Kd s^2 + Kp s + Ki) / s
        TransferFunction::new(vec![kd, kp, ki], vec![1.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial;

    #[test]
    fn unfiltered_pid_form() {
        let c = build_controller(&PidGains::new(2.0, 3.0, 0.5, DerivativeFilter::disabled()))
            .unwrap();
        assert_eq!(c.num(), &[0.5, 2.0, 3.0]);
        assert_eq!(c.den(), &[1.0, 0.0]);
    }

    #[test]
    fn filtered_pid_form() {
        let c = build_controller(&PidGains::new(2.0, 3.0, 0.5, DerivativeFilter::default()))
            .unwrap();
        // num = Kd s^2 + (Kp s + Ki)(Tf s + 1)
        let expected = [0.5 + 2.0 * 0.01, 2.0 + 3.0 * 0.01, 3.0];
        assert_eq!(c.num().len(), 3);
        for (got, want) in c.num().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
        assert_eq!(c.den(), &[0.01, 1.0, 0.0]);
        assert!(c.is_proper());
    }

    #[test]
    fn filter_is_irrelevant_without_derivative() {
        let filtered = build_controller(&PidGains::new(4.0, 1.0, 0.0, DerivativeFilter::default()))
            .unwrap();
        let plain =
            build_controller(&PidGains::new(4.0, 1.0, 0.0, DerivativeFilter::disabled())).unwrap();
        assert_eq!(filtered, plain);
        for s in [0.5, 1.0, 7.0] {
            let a = polynomial::eval(filtered.num(), s) / polynomial::eval(filtered.den(), s);
            assert!((a - (4.0 + 1.0 / s)).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_non_positive_filter_constant() {
        let filter = DerivativeFilter {
            enabled: true,
            time_constant: 0.0,
        };
        assert!(build_controller(&PidGains::new(1.0, 1.0, 1.0, filter)).is_err());
    }

    #[test]
    fn comparison_variants() {
        let g = PidGains::new(10.0, -2.0, 3.0, DerivativeFilter::default());
        assert_eq!(g.clamped_non_negative().as_array(), [10.0, 0.0, 3.0]);
        assert_eq!(g.p_only().as_array(), [10.0, 0.0, 0.0]);
        assert_eq!(g.pi_only().as_array(), [10.0, -2.0, 0.0]);
    }
}
