//! Core state types for the spring-mass simulation.
//!
//! - `PhysicalState` holds position, velocity (as `NVec2`) and elapsed time `t`
//! - `Vec2` is the plain `{x, y}` pair used on the message boundary
//!
//! In 1D mode only the `x` components are meaningful, `y` and `vy` stay at 0.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type NVec2 = Vector2<f64>;

/// Plain 2-vector as it crosses the context boundary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<NVec2> for Vec2 {
    fn from(v: NVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vec2> for NVec2 {
    fn from(v: Vec2) -> Self {
        NVec2::new(v.x, v.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalState {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub t: f64, // time since last re-anchor
}

impl PhysicalState {
    /// State at rest at `position`, clock at 0
    pub fn at_rest(position: NVec2) -> Self {
        Self {
            x: position,
            v: NVec2::zeros(),
            t: 0.0,
        }
    }

    pub fn new(x: NVec2, v: NVec2) -> Self {
        Self { x, v, t: 0.0 }
    }

    /// Drop the vertical components, used when running in 1D mode
    pub fn flattened(mut self) -> Self {
        self.x.y = 0.0;
        self.v.y = 0.0;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.x.iter().chain(self.v.iter()).all(|c| c.is_finite()) && self.t.is_finite()
    }
}

impl Default for PhysicalState {
    fn default() -> Self {
        Self::at_rest(NVec2::zeros())
    }
}
