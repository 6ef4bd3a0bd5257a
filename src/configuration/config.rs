//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – dynamics mode, step-loop cadence, queue size, run length
//! - [`ParametersConfig`] – mass, spring constant and damping
//! - [`InitialConfig`]    – initial position and velocity
//! - [`ScriptedCommand`]  – optional commands sent to the context at set times
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   mode: "1D"              # or "VECTOR"
//!   tick_hz: 120.0          # step loop cadence, dt stays 1/120
//!   queue_capacity: 256
//!   t_end: 5.0              # simulated seconds to run
//!
//! parameters:
//!   m: 1.0
//!   k: 10.0
//!   c: 0.5
//!
//! initial:
//!   x: 1.2
//!   y: 0.0
//!   vx: 0.0
//!   vy: 0.0
//!
//! script:
//!   - at: 2.5
//!     command:
//!       type: set_position
//!       position: { x: 1.5, y: 0.0 }
//! ```

use serde::Deserialize;

use crate::simulation::params::{Mode, TICK_HZ};
use crate::worker::protocol::Command;

fn default_tick_hz() -> f64 {
    TICK_HZ
}

fn default_queue_capacity() -> usize {
    256
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: Mode, // "1D" or "VECTOR"
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64, // wall-clock step rate
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize, // bounded command queue size
    pub t_end: f64, // simulated time to run before stopping
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub m: f64, // mass
    pub k: f64, // spring constant
    pub c: f64, // damping coefficient
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct InitialConfig {
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

/// A command to submit once the simulated clock reaches `at`
#[derive(Deserialize, Debug, Clone)]
pub struct ScriptedCommand {
    pub at: f64,
    pub command: Command,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub initial: InitialConfig,
    #[serde(default)]
    pub script: Vec<ScriptedCommand>,
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
