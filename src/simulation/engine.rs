//! Spring-mass simulation engine
//!
//! `SpringEngine` owns one parameter set and one evolving `PhysicalState`,
//! plus the initial condition the analytical curve is anchored to. It holds
//! no timer: whoever owns it decides when `step` runs.

use crate::error::{Result, SimError};
use crate::simulation::analytical::{initial_condition, solve, AnalyticalSolution};
use crate::simulation::integrator::step_state;
use crate::simulation::params::{Mode, Parameters, DT};
use crate::simulation::states::{NVec2, PhysicalState};

#[derive(Debug, Clone)]
pub struct SpringEngine {
    params: Parameters,
    state: PhysicalState,
    anchor: PhysicalState, // state captured at the last configure / set_position
}

impl SpringEngine {
    pub fn new(params: Parameters, initial: PhysicalState) -> Result<Self> {
        let mut engine = Self {
            params: Parameters::default(),
            state: PhysicalState::default(),
            anchor: PhysicalState::default(),
        };
        engine.configure(params, initial)?;
        Ok(engine)
    }

    /// Overwrite parameters and state, clock back to 0
    pub fn configure(&mut self, params: Parameters, initial: PhysicalState) -> Result<()> {
        params.validate()?;
        if !initial.is_finite() {
            return Err(SimError::InvalidParameter("initial state must be finite".into()));
        }
        self.params = params;
        self.reanchor(initial);
        Ok(())
    }

    /// Change parameters, keeping the current motion
    /// A mode switch re-anchors at the current position with the clock at 0
    pub fn set_parameters(&mut self, params: Parameters) -> Result<()> {
        params.validate()?;
        let mode_changed = params.mode != self.params.mode;
        self.params = params;
        if mode_changed {
            self.reanchor(self.state);
        }
        Ok(())
    }

    /// Place the mass at `position` at rest; this is the new initial condition
    pub fn set_position(&mut self, position: NVec2) -> Result<()> {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(SimError::InvalidParameter("position must be finite".into()));
        }
        self.reanchor(PhysicalState::at_rest(position));
        Ok(())
    }

    /// Advance one fixed `DT` and return the new state
    pub fn step(&mut self) -> PhysicalState {
        step_state(&mut self.state, &self.params, DT);
        self.state
    }

    /// Closed form for the current parameters and the anchored initial condition
    pub fn analytical_solution(&self) -> AnalyticalSolution {
        let (x0, v0) = initial_condition(&self.params, &self.anchor);
        solve(&self.params, x0, v0)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn state(&self) -> &PhysicalState {
        &self.state
    }

    pub fn anchor(&self) -> &PhysicalState {
        &self.anchor
    }

    /// Run a default engine for a few steps and describe the outcome
    pub fn self_test() -> Result<String> {
        let params = Parameters::default();
        let mut engine = SpringEngine::new(params, PhysicalState::at_rest(NVec2::new(1.2, 0.0)))?;
        let mut last = *engine.state();
        for _ in 0..3 {
            last = engine.step();
        }
        if !last.is_finite() {
            return Err(SimError::Initialization("self-test produced a non-finite state".into()));
        }
        let sol = engine.analytical_solution();
        Ok(format!(
            "rk4 self-test ok: x={:.6}, vx={:.6}, t={:.6}, regime={:?}",
            last.x.x, last.v.x, last.t, sol.regime()
        ))
    }

    fn reanchor(&mut self, state: PhysicalState) {
        let mut state = match self.params.mode {
            Mode::OneD => state.flattened(),
            Mode::Vector => state,
        };
        state.t = 0.0;
        self.state = state;
        self.anchor = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::analytical::DampingRegime;

    #[test]
    fn set_position_restarts_clock() {
        let mut engine = SpringEngine::new(Parameters::default(), PhysicalState::at_rest(NVec2::new(1.2, 0.0))).unwrap();
        for _ in 0..240 {
            engine.step();
        }
        engine.set_position(NVec2::new(1.5, 0.0)).unwrap();
        let s = engine.step();
        assert!((s.t - DT).abs() < 1e-12, "time carried over: {}", s.t);
    }

    #[test]
    fn analytical_is_fixed_during_a_run() {
        let mut engine = SpringEngine::new(Parameters::default(), PhysicalState::at_rest(NVec2::new(1.2, 0.0))).unwrap();
        let before = engine.analytical_solution();
        for _ in 0..100 {
            engine.step();
        }
        assert_eq!(before, engine.analytical_solution());
    }

    #[test]
    fn mode_switch_reanchors() {
        let mut engine = SpringEngine::new(Parameters::default(), PhysicalState::at_rest(NVec2::new(1.2, 0.0))).unwrap();
        engine.step();
        let mut p = *engine.parameters();
        p.mode = Mode::Vector;
        engine.set_parameters(p).unwrap();
        assert_eq!(engine.state().t, 0.0);
        assert_eq!(engine.anchor(), engine.state());
    }

    #[test]
    fn one_d_discards_vertical_components() {
        let initial = PhysicalState::new(NVec2::new(1.2, 0.4), NVec2::new(0.0, 2.0));
        let engine = SpringEngine::new(Parameters::default(), initial).unwrap();
        assert_eq!(engine.state().x.y, 0.0);
        assert_eq!(engine.state().v.y, 0.0);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut engine = SpringEngine::new(Parameters::default(), PhysicalState::default()).unwrap();
        let bad = Parameters::new(-1.0, 10.0, 0.5, Mode::OneD);
        assert!(engine.configure(bad, PhysicalState::default()).is_err());
        // previous configuration survives
        assert_eq!(engine.parameters().m, 1.0);
    }

    #[test]
    fn self_test_reports_regime() {
        let report = SpringEngine::self_test().unwrap();
        assert!(report.contains(&format!("{:?}", DampingRegime::Underdamped)));
    }
}
