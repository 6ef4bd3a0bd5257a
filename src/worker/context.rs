//! Per-context engine state machine
//!
//! An [`EngineContext`] owns at most one [`SpringEngine`], its step timer and
//! the queue of commands that arrived before the engine was ready:
//!
//! ```text
//! Uninitialized -> Initializing -> Ready -> (Running | Paused) -> Disposed
//! ```
//!
//! The context processes one message at a time. Commands submitted while the
//! engine does not exist are queued and trigger initialization; once the engine
//! is built the queue drains in submission order. A failing command is reported
//! as an `error` event and does not stop the drain.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{tick, Receiver, Sender, TryRecvError};

use crate::error::{Result, SimError};
use crate::simulation::engine::SpringEngine;
use crate::simulation::params::{Mode, Parameters};
use crate::simulation::states::{NVec2, PhysicalState, Vec2};
use crate::worker::protocol::{Command, Event, InitialState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLifecycle {
    Uninitialized,
    Initializing,
    Ready,
    Running,
    Paused,
    Disposed,
}

impl EngineLifecycle {
    /// An engine exists and commands apply immediately
    pub fn has_engine(self) -> bool {
        matches!(self, EngineLifecycle::Ready | EngineLifecycle::Running | EngineLifecycle::Paused)
    }
}

/// Builds the engine for a context
/// `self_test` runs first and its report becomes the `ready` payload
pub trait EngineFactory: Send + Sync {
    fn build(&self) -> Result<SpringEngine>;

    fn self_test(&self) -> Result<String> {
        SpringEngine::self_test()
    }
}

impl<F> EngineFactory for F
where
    F: Fn() -> Result<SpringEngine> + Send + Sync,
{
    fn build(&self) -> Result<SpringEngine> {
        self()
    }
}

/// Default parameters, mass at rest at equilibrium
pub struct DefaultFactory;

impl EngineFactory for DefaultFactory {
    fn build(&self) -> Result<SpringEngine> {
        let params = Parameters::default();
        SpringEngine::new(params, PhysicalState::at_rest(NVec2::new(params.equilibrium(), 0.0)))
    }
}

pub struct EngineContext {
    factory: Arc<dyn EngineFactory>,
    engine: Option<SpringEngine>,
    lifecycle: EngineLifecycle,
    pending: VecDeque<Command>,
    timer: Option<Receiver<Instant>>,
    tick_period: Duration,
    events: Sender<Event>,
    cancel: Option<Receiver<()>>, // disconnected or signalled once teardown is requested
}

impl EngineContext {
    pub fn new(factory: Arc<dyn EngineFactory>, tick_period: Duration, events: Sender<Event>) -> Self {
        Self {
            factory,
            engine: None,
            lifecycle: EngineLifecycle::Uninitialized,
            pending: VecDeque::new(),
            timer: None,
            tick_period,
            events,
            cancel: None,
        }
    }

    /// Stop emitting once `cancel` fires: an engine that finishes building
    /// after teardown was requested is discarded along with its queue
    pub fn with_cancel(mut self, cancel: Receiver<()>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Teardown has been requested
    pub fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |c| !matches!(c.try_recv(), Err(TryRecvError::Empty)))
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle
    }

    pub fn engine(&self) -> Option<&SpringEngine> {
        self.engine.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Receiver of the active step timer, if the loop is running
    pub fn timer(&self) -> Option<&Receiver<Instant>> {
        self.timer.as_ref()
    }

    /// Apply now if the engine exists, otherwise queue and initialize
    pub fn submit(&mut self, command: Command) {
        match self.lifecycle {
            EngineLifecycle::Disposed => {
                self.emit(Event::error(format!("{} rejected: context disposed", command.name())));
            }
            lifecycle if lifecycle.has_engine() => {
                self.apply_reporting(command);
            }
            EngineLifecycle::Uninitialized => {
                self.pending.push_back(command);
                self.initialize();
            }
            _ => {
                self.pending.push_back(command);
            }
        }
    }

    /// One timer tick: step and emit, only while running
    pub fn tick(&mut self) {
        if self.lifecycle != EngineLifecycle::Running {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            let state = engine.step();
            self.emit(Event::step(&state));
        }
    }

    /// Tear down; queued commands are discarded
    pub fn dispose(&mut self) {
        self.timer = None;
        self.engine = None;
        self.pending.clear();
        self.lifecycle = EngineLifecycle::Disposed;
    }

    fn initialize(&mut self) {
        self.lifecycle = EngineLifecycle::Initializing;

        let built = self
            .factory
            .self_test()
            .and_then(|report| Ok((self.factory.build()?, report)));

        if self.cancelled() {
            self.dispose();
            return;
        }

        match built {
            Ok((engine, report)) => {
                self.engine = Some(engine);
                self.lifecycle = EngineLifecycle::Ready;
                self.emit(Event::Ready { test_result: report });
                self.drain();
            }
            Err(e) => {
                // stays uninitialized until the next submit retries
                self.lifecycle = EngineLifecycle::Uninitialized;
                self.emit(Event::error(e.to_string()));
            }
        }
    }

    fn drain(&mut self) {
        while let Some(command) = self.pending.pop_front() {
            if self.cancelled() {
                self.dispose();
                return;
            }
            self.apply_reporting(command);
        }
    }

    fn apply_reporting(&mut self, command: Command) {
        let name = command.name();
        if let Err(e) = self.apply(command) {
            self.emit(Event::error(format!("{} failed: {}", name, e)));
        }
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Start { params, initial } => self.start(params, initial),
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::Reset { params, initial } => {
                self.stop();
                self.update_params(params, Some(initial))
            }
            Command::UpdateParams { params, initial } => self.update_params(params, initial),
            Command::SetPosition { position } => self.set_position(position),
        }
    }

    /// Resuming with the engine's own parameters and state keeps the clock and anchor
    fn start(&mut self, params: Parameters, initial: InitialState) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(SimError::NotReady)?;

        let initial: PhysicalState = initial.into();
        if needs_configure(engine, &params, &initial) {
            engine.configure(params, initial)?;
        }
        let analytical = engine.analytical_solution();

        // at most one step loop: drop the old timer before installing a new one
        self.timer = None;
        self.timer = Some(tick(self.tick_period));
        self.lifecycle = EngineLifecycle::Running;

        self.emit(Event::Started { analytical });
        Ok(())
    }

    fn stop(&mut self) {
        if self.lifecycle != EngineLifecycle::Running {
            return;
        }
        self.timer = None;
        self.lifecycle = EngineLifecycle::Paused;
        self.emit(Event::Stopped);
    }

    fn update_params(&mut self, params: Parameters, initial: Option<InitialState>) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(SimError::NotReady)?;

        match initial {
            Some(initial) => engine.configure(params, initial.into())?,
            None => engine.set_parameters(params)?,
        }
        let analytical = engine.analytical_solution();

        self.emit(Event::ParamsUpdated { analytical });
        Ok(())
    }

    fn set_position(&mut self, position: Vec2) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(SimError::NotReady)?;

        engine.set_position(position.into())?;
        let event = Event::analytical_updated(engine.analytical_solution(), engine.state());

        self.emit(event);
        Ok(())
    }

    fn emit(&self, event: Event) {
        // a controller that stopped listening is not an engine failure
        let _ = self.events.send(event);
    }
}

/// `start` keeps the current motion when it is resumed with the same
/// parameters and the state the engine already holds
fn needs_configure(engine: &SpringEngine, params: &Parameters, initial: &PhysicalState) -> bool {
    let requested = match params.mode {
        Mode::OneD => initial.flattened(),
        Mode::Vector => *initial,
    };
    let current = engine.state();
    engine.parameters() != params || current.x != requested.x || current.v != requested.v
}
