//! DC-motor plant model.
//!
//! Armature circuit `L di/dt + R i = V - Ke w` coupled to the rotor
//! `J dw/dt + b w = Kt i` gives the voltage-to-speed transfer function
//!
//! ```text
//! G(s) = Kt / ((L s + R)(J s + b) + Kt Ke)
//! ```
//!
//! Neglecting `L` drops one pole and yields the first-order approximation
//! `Kt / (R J s + R b + Kt Ke)`.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::transfer_function::TransferFunction;

/// Electrical and electromechanical constants that are always known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorConstants {
    /// Armature resistance (Ohm).
    pub r: f64,
    /// Armature inductance (H).
    pub l: f64,
    /// Torque constant (N·m/A).
    pub kt: f64,
    /// Back-EMF constant (V·s/rad).
    pub ke: f64,
}

impl Default for MotorConstants {
    fn default() -> Self {
        Self {
            r: 1.0,
            l: 0.5,
            kt: 0.01,
            ke: 0.01,
        }
    }
}

/// A mechanical parameter that is either supplied or left for identification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MechanicalParam {
    Known { value: f64 },
    Unknown,
}

impl MechanicalParam {
    pub fn known(value: f64) -> Self {
        MechanicalParam::Known { value }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, MechanicalParam::Unknown)
    }

    /// Known value, falling back to `estimate` for an unknown parameter.
    pub fn resolve(&self, name: &'static str, estimate: Option<f64>) -> ControlResult<f64> {
        match (self, estimate) {
            (MechanicalParam::Known { value }, _) => Ok(*value),
            (MechanicalParam::Unknown, Some(estimate)) => Ok(estimate),
            (MechanicalParam::Unknown, None) => Err(ControlError::Unresolved { name }),
        }
    }
}

/// Fully resolved physical description of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParameters {
    /// Armature resistance (Ohm).
    pub r: f64,
    /// Armature inductance (H). Ignored when `include_inductance` is false.
    pub l: f64,
    /// Rotor inertia (kg·m²).
    pub j: f64,
    /// Viscous damping (N·m·s).
    pub b: f64,
    /// Torque constant (N·m/A).
    pub kt: f64,
    /// Back-EMF constant (V·s/rad).
    pub ke: f64,
    /// Second-order model with armature inductance when true.
    pub include_inductance: bool,
}

impl PlantParameters {
    pub fn new(constants: MotorConstants, j: f64, b: f64, include_inductance: bool) -> Self {
        Self {
            r: constants.r,
            l: constants.l,
            j,
            b,
            kt: constants.kt,
            ke: constants.ke,
            include_inductance,
        }
    }

    /// Merge known constants with possibly-unknown mechanical parameters.
    ///
    /// `estimate` is the identified `(J, b)` pair; explicit known values win.
    pub fn resolve(
        constants: MotorConstants,
        j: MechanicalParam,
        b: MechanicalParam,
        estimate: Option<(f64, f64)>,
        include_inductance: bool,
    ) -> ControlResult<Self> {
        let j = j.resolve("J", estimate.map(|e| e.0))?;
        let b = b.resolve("b", estimate.map(|e| e.1))?;
        Ok(Self::new(constants, j, b, include_inductance))
    }

    /// True when every parameter the model order uses is strictly positive.
    pub fn is_physical(&self) -> bool {
        let inductance_ok = !self.include_inductance || self.l > 0.0;
        [self.r, self.j, self.b, self.kt, self.ke]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
            && inductance_ok
    }
}

/// Build the voltage-to-speed transfer function of the motor.
///
/// No physical validation happens here; non-positive parameters produce
/// whatever polynomial they imply and consumers guard against instability.
pub fn build_plant(p: &PlantParameters) -> ControlResult<TransferFunction> {
    let num = vec![p.kt];
    let den = if p.include_inductance {
        vec![
            p.l * p.j,
            p.l * p.b + p.r * p.j,
            p.r * p.b + p.kt * p.ke,
        ]
    } else {
        vec![p.r * p.j, p.r * p.b + p.kt * p.ke]
    };
    TransferFunction::new(num, den)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> PlantParameters {
        PlantParameters::new(MotorConstants::default(), 0.01, 0.1, true)
    }

    #[test]
    fn second_order_coefficients() {
        let g = build_plant(&reference()).unwrap();
        assert_eq!(g.num(), &[0.01]);
        assert_eq!(g.den().len(), 3);
        let expected = [0.005, 0.06, 0.1001];
        for (got, want) in g.den().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn first_order_drops_inductance() {
        let p = PlantParameters {
            include_inductance: false,
            ..reference()
        };
        let g = build_plant(&p).unwrap();
        assert_eq!(g.den().len(), 2);
        assert!((g.den()[0] - 0.01).abs() < 1e-15);
        assert!((g.den()[1] - 0.1001).abs() < 1e-15);
    }

    #[test]
    fn build_is_deterministic() {
        let a = build_plant(&reference()).unwrap();
        let b = build_plant(&reference()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn resolve_prefers_known_values() {
        let p = PlantParameters::resolve(
            MotorConstants::default(),
            MechanicalParam::known(0.02),
            MechanicalParam::Unknown,
            Some((0.5, 0.3)),
            true,
        )
        .unwrap();
        assert_eq!(p.j, 0.02);
        assert_eq!(p.b, 0.3);
    }

    #[test]
    fn resolve_requires_estimate_for_unknown() {
        let err = PlantParameters::resolve(
            MotorConstants::default(),
            MechanicalParam::Unknown,
            MechanicalParam::known(0.1),
            None,
            true,
        )
        .unwrap_err();
        assert_eq!(err, ControlError::Unresolved { name: "J" });
    }

    #[test]
    fn physical_check() {
        assert!(reference().is_physical());
        let negative_j = PlantParameters::new(MotorConstants::default(), -1.0, 0.1, true);
        assert!(!negative_j.is_physical());
        let no_l = PlantParameters {
            l: 0.0,
            include_inductance: false,
            ..reference()
        };
        assert!(no_l.is_physical());
    }
}
