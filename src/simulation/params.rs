//! Physical parameters and fixed constants for the spring-mass system
//!
//! `Parameters` holds the user-tunable values:
//! - mass `m`, spring constant `k`, damping coefficient `c`,
//! - the dynamics `mode` (1D axial or VECTOR planar)
//!
//! Gravity, natural length and the step size are fixed constants.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

pub const G: f64 = 9.81; // gravitational acceleration (m/s^2)
pub const L0: f64 = 1.0; // natural spring length (m)
pub const TICK_HZ: f64 = 120.0; // nominal step rate
pub const DT: f64 = 1.0 / TICK_HZ; // fixed integration step (s)
pub const RADIUS_EPS: f64 = 1e-9; // below this radius the unit vector falls back to (0, 1)
pub const CRITICAL_BAND: f64 = 1e-9; // |zeta - 1| below this is critical damping

/// Which dynamics model the integrator uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "1D")] // vertical spring, single axis
    #[default]
    OneD,

    #[serde(rename = "VECTOR")] // planar spring hanging from a fixed pivot
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub m: f64, // mass
    pub k: f64, // spring constant
    pub c: f64, // damping coefficient
    #[serde(default)]
    pub mode: Mode,
}

impl Parameters {
    pub fn new(m: f64, k: f64, c: f64, mode: Mode) -> Self {
        Self { m, k, c, mode }
    }

    /// Reject values the integrator and closed form cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.m.is_finite() && self.m > 0.0) {
            return Err(SimError::InvalidParameter(format!("mass must be > 0, got {}", self.m)));
        }
        if !(self.k.is_finite() && self.k > 0.0) {
            return Err(SimError::InvalidParameter(format!("spring constant must be > 0, got {}", self.k)));
        }
        if !(self.c.is_finite() && self.c >= 0.0) {
            return Err(SimError::InvalidParameter(format!("damping must be >= 0, got {}", self.c)));
        }
        Ok(())
    }

    /// Equilibrium length `L0 + m g / k` (1D position and VECTOR radius alike)
    pub fn equilibrium(&self) -> f64 {
        L0 + self.m * G / self.k
    }

    /// Natural angular frequency `sqrt(k / m)`
    pub fn omega_n(&self) -> f64 {
        (self.k / self.m).sqrt()
    }

    /// Damping ratio `c / (2 sqrt(k m))`
    pub fn zeta(&self) -> f64 {
        self.c / (2.0 * (self.k * self.m).sqrt())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            m: 1.0,
            k: 10.0,
            c: 0.5,
            mode: Mode::OneD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_physical_values() {
        assert!(Parameters::new(0.0, 10.0, 0.0, Mode::OneD).validate().is_err());
        assert!(Parameters::new(1.0, -1.0, 0.0, Mode::OneD).validate().is_err());
        assert!(Parameters::new(1.0, 10.0, -0.1, Mode::OneD).validate().is_err());
        assert!(Parameters::new(f64::NAN, 10.0, 0.0, Mode::OneD).validate().is_err());
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn mode_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Mode::OneD).unwrap(), "\"1D\"");
        assert_eq!(serde_json::to_string(&Mode::Vector).unwrap(), "\"VECTOR\"");
    }

    #[test]
    fn equilibrium_matches_example() {
        let p = Parameters::default();
        assert!((p.equilibrium() - 1.981).abs() < 1e-12);
    }
}
