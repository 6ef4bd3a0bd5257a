pub mod error;
pub mod simulation;
pub mod configuration;
pub mod worker;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{PhysicalState, NVec2, Vec2};
pub use simulation::params::{Parameters, Mode, G, L0, DT, TICK_HZ};
pub use simulation::forces::{Acceleration, AxialSpring, RadialSpring, mechanical_energy};
pub use simulation::integrator::{rk4_step, step_state};
pub use simulation::analytical::{AnalyticalSolution, DampingRegime, solve};
pub use simulation::engine::SpringEngine;
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, ParametersConfig, InitialConfig, ScriptedCommand, ScenarioConfig};

pub use worker::protocol::{Command, Event, InitialState};
pub use worker::context::{EngineContext, EngineLifecycle, EngineFactory, DefaultFactory};
pub use worker::runtime::{SimulationHandle, RuntimeConfig};

pub use benchmark::benchmark::{bench_step, bench_energy_drift};
