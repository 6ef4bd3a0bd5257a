//! Build runnable scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario` bundle:
//! - validated `Parameters`
//! - initial `PhysicalState` at t = 0
//! - `RuntimeConfig` for the context thread
//! - scripted commands sorted by time
//!
//! `start_command` and `reference_engine` give the CLI what it needs to drive
//! a `SimulationHandle` and to compare against the closed form.

use crate::configuration::config::{ScenarioConfig, ScriptedCommand};
use crate::error::Result;
use crate::simulation::engine::SpringEngine;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec2, PhysicalState};
use crate::worker::protocol::{Command, InitialState};
use crate::worker::runtime::RuntimeConfig;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub parameters: Parameters,
    pub initial: PhysicalState,
    pub runtime: RuntimeConfig,
    pub t_end: f64,
    pub script: Vec<ScriptedCommand>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let parameters = Parameters::new(cfg.parameters.m, cfg.parameters.k, cfg.parameters.c, cfg.engine.mode);
        parameters.validate()?;

        let initial = PhysicalState::new(
            NVec2::new(cfg.initial.x, cfg.initial.y),
            NVec2::new(cfg.initial.vx, cfg.initial.vy),
        );

        let runtime = RuntimeConfig {
            tick_hz: cfg.engine.tick_hz,
            queue_capacity: cfg.engine.queue_capacity,
        };

        // stable sort keeps same-time commands in file order
        let mut script = cfg.script;
        script.sort_by(|a, b| a.at.total_cmp(&b.at));

        Ok(Self {
            parameters,
            initial,
            runtime,
            t_end: cfg.engine.t_end,
            script,
        })
    }

    pub fn start_command(&self) -> Command {
        Command::Start {
            params: self.parameters,
            initial: InitialState::from(&self.initial),
        }
    }

    /// Local engine with the same configuration, for offline comparison
    pub fn reference_engine(&self) -> Result<SpringEngine> {
        SpringEngine::new(self.parameters, self.initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_sorted_by_time() {
        let cfg = ScenarioConfig::from_yaml(
            r#"
engine: { mode: "1D", t_end: 3.0 }
parameters: { m: 1.0, k: 10.0, c: 0.5 }
initial: { x: 1.2 }
script:
  - { at: 2.0, command: { type: stop } }
  - { at: 0.5, command: { type: set_position, position: { x: 1.5, y: 0.0 } } }
"#,
        )
        .unwrap();
        let scenario = Scenario::build_scenario(cfg).unwrap();
        assert_eq!(scenario.script[0].at, 0.5);
        assert!(matches!(scenario.script[1].command, Command::Stop));
    }

    #[test]
    fn invalid_parameters_fail_to_build() {
        let cfg = ScenarioConfig::from_yaml(
            r#"
engine: { t_end: 1.0 }
parameters: { m: 0.0, k: 10.0, c: 0.5 }
initial: { x: 1.2 }
"#,
        )
        .unwrap();
        assert!(Scenario::build_scenario(cfg).is_err());
    }
}
