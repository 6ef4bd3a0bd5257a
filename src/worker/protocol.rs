//! Messages crossing the simulation context boundary
//!
//! [`Command`] flows from the controller into the context, [`Event`] flows
//! back out. Both are closed sum types tagged by `type` on the wire, e.g.
//!
//! ```json
//! {"type": "update_params", "params": {"m": 1.0, "k": 20.0, "c": 0.5, "mode": "1D"}}
//! {"type": "step", "position": {"x": 1.21, "y": 0.0}, "velocity": {"x": 0.07, "y": 0.0}, "time": 0.0083}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::simulation::analytical::AnalyticalSolution;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec2, PhysicalState, Vec2};

/// Initial condition `{x, y, vx, vy}` as sent by the controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InitialState {
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

impl From<InitialState> for PhysicalState {
    fn from(s: InitialState) -> Self {
        PhysicalState::new(NVec2::new(s.x, s.y), NVec2::new(s.vx, s.vy))
    }
}

impl From<&PhysicalState> for InitialState {
    fn from(s: &PhysicalState) -> Self {
        Self {
            x: s.x.x,
            y: s.x.y,
            vx: s.v.x,
            vy: s.v.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Start {
        params: Parameters,
        initial: InitialState,
    },
    Stop,
    Reset {
        params: Parameters,
        initial: InitialState,
    },
    UpdateParams {
        params: Parameters,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial: Option<InitialState>,
    },
    SetPosition {
        position: Vec2,
    },
}

impl Command {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the variant, used in error reports
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Stop => "stop",
            Command::Reset { .. } => "reset",
            Command::UpdateParams { .. } => "update_params",
            Command::SetPosition { .. } => "set_position",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Ready {
        #[serde(rename = "testResult")]
        test_result: String,
    },
    Started {
        analytical: AnalyticalSolution,
    },
    Stopped,
    ParamsUpdated {
        analytical: AnalyticalSolution,
    },
    AnalyticalUpdated {
        analytical: AnalyticalSolution,
        position: Vec2,
        velocity: Vec2,
        time: f64,
    },
    Step {
        position: Vec2,
        velocity: Vec2,
        time: f64,
    },
    Error {
        message: String,
    },
}

impl Event {
    pub fn step(state: &PhysicalState) -> Self {
        Event::Step {
            position: state.x.into(),
            velocity: state.v.into(),
            time: state.t,
        }
    }

    pub fn analytical_updated(analytical: AnalyticalSolution, state: &PhysicalState) -> Self {
        Event::AnalyticalUpdated {
            analytical,
            position: state.x.into(),
            velocity: state.v.into(),
            time: state.t,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Event::Error { message: message.into() }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::Mode;

    #[test]
    fn parses_controller_messages() {
        let cmd = Command::from_json(
            r#"{"type":"start","params":{"m":1,"k":10,"c":0.5,"mode":"VECTOR"},"initial":{"x":0.3,"y":1.8,"vx":0,"vy":0}}"#,
        )
        .unwrap();
        match cmd {
            Command::Start { params, initial } => {
                assert_eq!(params.mode, Mode::Vector);
                assert_eq!(initial.y, 1.8);
            }
            other => panic!("unexpected {:?}", other),
        }

        let cmd = Command::from_json(r#"{"type":"update_params","params":{"m":1,"k":5,"c":0,"mode":"1D"}}"#).unwrap();
        assert_eq!(
            cmd,
            Command::UpdateParams {
                params: Parameters::new(1.0, 5.0, 0.0, Mode::OneD),
                initial: None,
            }
        );

        assert_eq!(Command::from_json(r#"{"type":"stop"}"#).unwrap(), Command::Stop);
    }

    #[test]
    fn unknown_message_type_is_an_error() {
        assert!(Command::from_json(r#"{"type":"warp_speed"}"#).is_err());
    }

    #[test]
    fn optional_initial_is_omitted_on_the_wire() {
        let cmd = Command::UpdateParams { params: Parameters::default(), initial: None };
        let json = cmd.to_json().unwrap();
        assert!(!json.contains("initial"));
        assert_eq!(Command::from_json(&json).unwrap(), cmd);
    }

    #[test]
    fn controller_reads_analytical_update() {
        let event = Event::from_json(
            r#"{"type":"analytical_updated","analytical":{"case":"critical","omega_n":1.0,"zeta":1.0,"omega_d":0.0,"A":0.5,"B":0.5},"position":{"x":1.5,"y":0.0},"velocity":{"x":0.0,"y":0.0},"time":0.0}"#,
        )
        .unwrap();
        match event {
            Event::AnalyticalUpdated { analytical, position, .. } => {
                assert_eq!(analytical.regime(), crate::simulation::analytical::DampingRegime::Critical);
                assert_eq!(position, Vec2::new(1.5, 0.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn events_carry_wire_field_names() {
        let json = Event::Ready { test_result: "ok".into() }.to_json().unwrap();
        assert!(json.contains("\"type\":\"ready\""));
        assert!(json.contains("\"testResult\":\"ok\""));

        let state = PhysicalState::new(NVec2::new(1.0, 2.0), NVec2::new(3.0, 4.0));
        let value: serde_json::Value = serde_json::from_str(&Event::step(&state).to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "step");
        assert_eq!(value["position"]["y"], 2.0);
        assert_eq!(value["velocity"]["x"], 3.0);
        assert_eq!(value["time"], 0.0);
    }
}
