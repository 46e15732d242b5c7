//! Rational Laplace-domain transfer functions.
//!
//! H(s) = B(s) / A(s) with both polynomials in descending powers of `s`.
//! Values are immutable; every composition returns a new transfer function.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::polynomial;

/// SISO transfer function in numerator/denominator coefficient form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl TransferFunction {
    /// Create a transfer function from coefficient sequences (highest degree first).
    ///
    /// Coefficients are stored exactly as given. Fails when a coefficient is
    /// not finite or the denominator is identically zero.
    pub fn new(num: Vec<f64>, den: Vec<f64>) -> ControlResult<Self> {
        if num.is_empty() {
            return Err(ControlError::InvalidArg {
                what: "numerator must have at least one coefficient",
            });
        }
        if num.iter().any(|c| !c.is_finite()) {
            return Err(ControlError::NonFinite { what: "numerator" });
        }
        if den.iter().any(|c| !c.is_finite()) {
            return Err(ControlError::NonFinite {
                what: "denominator",
            });
        }
        if polynomial::is_zero(&den) {
            return Err(ControlError::DegenerateDenominator {
                what: format!("{den:?}"),
            });
        }
        Ok(Self { num, den })
    }

    /// Static gain `k`.
    pub fn gain(k: f64) -> ControlResult<Self> {
        Self::new(vec![k], vec![1.0])
    }

    /// Numerator coefficients, highest degree first.
    pub fn num(&self) -> &[f64] {
        &self.num
    }

    /// Denominator coefficients, highest degree first.
    pub fn den(&self) -> &[f64] {
        &self.den
    }

    /// Degree of the denominator (number of poles).
    pub fn order(&self) -> usize {
        polynomial::degree(&self.den)
    }

    /// True when the numerator degree does not exceed the denominator degree.
    pub fn is_proper(&self) -> bool {
        polynomial::is_zero(&self.num) || polynomial::degree(&self.num) <= self.order()
    }

    /// Steady-state gain H(0), or `None` for a pole at the origin.
    ///
    /// Common factors of `s` are cancelled first, so a P controller around
    /// an integrator-free plant still reports its finite DC gain.
    pub fn dc_gain(&self) -> Option<f64> {
        let (num, den) = polynomial::cancel_origin_factors(&self.num, &self.den);
        let d0 = polynomial::eval(&den, 0.0);
        if d0 == 0.0 {
            return None;
        }
        Some(polynomial::eval(&num, 0.0) / d0)
    }

    /// Series connection `self * other`.
    pub fn series(&self, other: &Self) -> ControlResult<Self> {
        Self::new(
            polynomial::mul(&self.num, &other.num),
            polynomial::mul(&self.den, &other.den),
        )
    }

    /// Parallel connection `self + other`.
    pub fn parallel(&self, other: &Self) -> ControlResult<Self> {
        let num = polynomial::add(
            &polynomial::mul(&self.num, &other.den),
            &polynomial::mul(&other.num, &self.den),
        );
        Self::new(num, polynomial::mul(&self.den, &other.den))
    }

    /// Negative feedback through `feedback`: G / (1 + G H).
    pub fn feedback(&self, feedback: &Self) -> ControlResult<Self> {
        let num = polynomial::mul(&self.num, &feedback.den);
        let den = polynomial::add(
            &polynomial::mul(&self.den, &feedback.den),
            &polynomial::mul(&self.num, &feedback.num),
        );
        Self::new(num, den)
    }

    /// Unity negative feedback: G / (1 + G).
    pub fn unity_feedback(&self) -> ControlResult<Self> {
        self.feedback(&Self::gain(1.0)?)
    }

    /// Multiply the numerator by a scalar gain.
    pub fn scaled(&self, k: f64) -> ControlResult<Self> {
        Self::new(polynomial::scale(&self.num, k), self.den.clone())
    }

    /// Equivalent form with trimmed leading zeros and a monic denominator.
    pub fn normalized(&self) -> Self {
        let den = polynomial::trim(&self.den);
        let lead = den[0];
        Self {
            num: polynomial::scale(&polynomial::trim(&self.num), 1.0 / lead),
            den: polynomial::scale(&den, 1.0 / lead),
        }
    }
}

fn format_poly(p: &[f64]) -> String {
    let p = polynomial::trim(p);
    let n = p.len() - 1;
    let mut terms = Vec::new();
    for (i, c) in p.iter().enumerate() {
        if *c == 0.0 && n > 0 {
            continue;
        }
        let power = n - i;
        let term = match power {
            0 => format!("{c}"),
            1 => format!("{c} s"),
            _ => format!("{c} s^{power}"),
        };
        terms.push(term);
    }
    terms.join(" + ")
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) / ({})", format_poly(&self.num), format_poly(&self.den))
    }
}
