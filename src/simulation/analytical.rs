//! Closed-form solution of the damped oscillator about equilibrium
//!
//! `solve` classifies the damping regime from `zeta = c / (2 sqrt(k m))` and
//! derives the coefficients of the matching closed form:
//! - underdamped: `e^(-zeta wn t) (A cos(wd t) + B sin(wd t))`
//! - critical:    `(A + B t) e^(-wn t)`
//! - overdamped:  `A e^(r1 t) + B e^(r2 t)`
//!
//! The result is recomputed wholesale whenever parameters or the initial
//! condition change, nothing here is incremental.

use serde::{Deserialize, Serialize};

use super::forces::radial;
use super::params::{Mode, Parameters, CRITICAL_BAND, RADIUS_EPS};
use super::states::PhysicalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DampingRegime {
    Underdamped,
    Critical,
    Overdamped,
}

impl DampingRegime {
    /// Total over `zeta`; the band `|zeta - 1| < 1e-9` is critical
    pub fn classify(zeta: f64) -> Self {
        if (zeta - 1.0).abs() < CRITICAL_BAND {
            DampingRegime::Critical
        } else if zeta < 1.0 {
            DampingRegime::Underdamped
        } else {
            DampingRegime::Overdamped
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "case", rename_all = "lowercase")]
pub enum AnalyticalSolution {
    Underdamped {
        omega_n: f64,
        zeta: f64,
        omega_d: f64,
        #[serde(rename = "A")]
        a: f64,
        #[serde(rename = "B")]
        b: f64,
    },
    Critical {
        omega_n: f64,
        zeta: f64,
        omega_d: f64, // always 0 at critical damping
        #[serde(rename = "A")]
        a: f64,
        #[serde(rename = "B")]
        b: f64,
    },
    Overdamped {
        omega_n: f64,
        zeta: f64,
        r1: f64,
        r2: f64,
        #[serde(rename = "A")]
        a: f64,
        #[serde(rename = "B")]
        b: f64,
    },
}

/// Closed form for displacement `x0` and velocity `v0` relative to equilibrium
pub fn solve(params: &Parameters, x0: f64, v0: f64) -> AnalyticalSolution {
    let omega_n = params.omega_n();
    let zeta = params.zeta();

    match DampingRegime::classify(zeta) {
        DampingRegime::Underdamped => {
            let omega_d = omega_n * (1.0 - zeta * zeta).sqrt();
            AnalyticalSolution::Underdamped {
                omega_n,
                zeta,
                omega_d,
                a: x0,
                b: (v0 + zeta * omega_n * x0) / omega_d,
            }
        }
        DampingRegime::Critical => AnalyticalSolution::Critical {
            omega_n,
            zeta,
            omega_d: 0.0,
            a: x0,
            b: v0 + omega_n * x0,
        },
        DampingRegime::Overdamped => {
            let sqrt_term = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega_n * (zeta - sqrt_term);
            let r2 = -omega_n * (zeta + sqrt_term);
            let det = r2 - r1;
            AnalyticalSolution::Overdamped {
                omega_n,
                zeta,
                r1,
                r2,
                a: (r2 * x0 - v0) / det,
                b: (v0 - r1 * x0) / det,
            }
        }
    }
}

/// Displacement and velocity of `state` relative to equilibrium
/// 1D uses the axis directly, VECTOR mode the radial distance and radial velocity
pub fn initial_condition(params: &Parameters, state: &PhysicalState) -> (f64, f64) {
    let x_eq = params.equilibrium();
    match params.mode {
        Mode::OneD => (state.x.x - x_eq, state.v.x),
        Mode::Vector => {
            let (r, u) = radial(&state.x);
            let v0 = if r > RADIUS_EPS { state.v.dot(&u) } else { 0.0 };
            (r - x_eq, v0)
        }
    }
}

impl AnalyticalSolution {
    pub fn regime(&self) -> DampingRegime {
        match self {
            AnalyticalSolution::Underdamped { .. } => DampingRegime::Underdamped,
            AnalyticalSolution::Critical { .. } => DampingRegime::Critical,
            AnalyticalSolution::Overdamped { .. } => DampingRegime::Overdamped,
        }
    }

    pub fn omega_n(&self) -> f64 {
        match *self {
            AnalyticalSolution::Underdamped { omega_n, .. }
            | AnalyticalSolution::Critical { omega_n, .. }
            | AnalyticalSolution::Overdamped { omega_n, .. } => omega_n,
        }
    }

    pub fn zeta(&self) -> f64 {
        match *self {
            AnalyticalSolution::Underdamped { zeta, .. }
            | AnalyticalSolution::Critical { zeta, .. }
            | AnalyticalSolution::Overdamped { zeta, .. } => zeta,
        }
    }

    /// Displacement from equilibrium at time `t`
    pub fn displacement(&self, t: f64) -> f64 {
        match *self {
            AnalyticalSolution::Underdamped { omega_n, zeta, omega_d, a, b } => {
                let decay = (-zeta * omega_n * t).exp();
                decay * (a * (omega_d * t).cos() + b * (omega_d * t).sin())
            }
            AnalyticalSolution::Critical { omega_n, a, b, .. } => (a + b * t) * (-omega_n * t).exp(),
            AnalyticalSolution::Overdamped { r1, r2, a, b, .. } => a * (r1 * t).exp() + b * (r2 * t).exp(),
        }
    }

    /// Rate of change of the displacement at time `t`
    pub fn velocity(&self, t: f64) -> f64 {
        match *self {
            AnalyticalSolution::Underdamped { omega_n, zeta, omega_d, a, b } => {
                let sigma = zeta * omega_n;
                let decay = (-sigma * t).exp();
                let (s, c) = (omega_d * t).sin_cos();
                decay * ((b * omega_d - sigma * a) * c - (sigma * b + a * omega_d) * s)
            }
            AnalyticalSolution::Critical { omega_n, a, b, .. } => {
                (b - omega_n * (a + b * t)) * (-omega_n * t).exp()
            }
            AnalyticalSolution::Overdamped { r1, r2, a, b, .. } => {
                r1 * a * (r1 * t).exp() + r2 * b * (r2 * t).exp()
            }
        }
    }
}
