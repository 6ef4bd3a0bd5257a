//! Background execution of an [`EngineContext`]
//!
//! [`SimulationHandle`] spawns one dedicated thread per context. The thread
//! owns the context outright; the controller only talks to it through a
//! bounded command channel and reads results from an event channel. Timer
//! ticks and incoming commands are multiplexed with `select!`, so exactly one
//! message is processed at a time.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, never, select, unbounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::error::{Result, SimError};
use crate::simulation::params::TICK_HZ;
use crate::worker::context::{DefaultFactory, EngineContext, EngineFactory};
use crate::worker::protocol::{Command, Event};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    pub tick_hz: f64, // wall-clock cadence of the step loop
    pub queue_capacity: usize, // commands buffered before submit reports QueueFull
}

impl RuntimeConfig {
    pub fn tick_period(&self) -> Result<Duration> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(SimError::InvalidParameter(format!("tick_hz must be > 0, got {}", self.tick_hz)));
        }
        Duration::try_from_secs_f64(1.0 / self.tick_hz)
            .map_err(|_| SimError::InvalidParameter(format!("tick_hz {} gives no representable period", self.tick_hz)))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_hz: TICK_HZ,
            queue_capacity: 256,
        }
    }
}

/// Channels and thread of the currently live context
struct Link {
    commands: Sender<Command>,
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

pub struct SimulationHandle {
    config: RuntimeConfig,
    factory: Arc<dyn EngineFactory>,
    events_tx: Sender<Event>,
    events: Receiver<Event>,
    link: Option<Link>,
}

impl SimulationHandle {
    pub fn spawn(config: RuntimeConfig) -> Result<Self> {
        Self::spawn_with(config, Arc::new(DefaultFactory))
    }

    pub fn spawn_with(config: RuntimeConfig, factory: Arc<dyn EngineFactory>) -> Result<Self> {
        config.tick_period()?;
        if config.queue_capacity == 0 {
            return Err(SimError::InvalidParameter("queue_capacity must be > 0".into()));
        }

        let (events_tx, events) = unbounded();
        let mut handle = Self {
            config,
            factory,
            events_tx,
            events,
            link: None,
        };
        handle.link = Some(handle.launch()?);
        Ok(handle)
    }

    /// Queue a command for the context, never blocks
    pub fn submit(&self, command: Command) -> Result<()> {
        let link = self.link.as_ref().ok_or(SimError::Disconnected)?;
        link.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => SimError::QueueFull,
            TrySendError::Disconnected(_) => SimError::Disconnected,
        })
    }

    /// Events emitted by the context, in emission order
    /// The receiver survives hard resets
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Tear the context down, discarding queued commands, and start a fresh
    /// one back at `Uninitialized`
    pub fn hard_reset(&mut self) -> Result<()> {
        self.terminate()?;
        self.link = Some(self.launch()?);
        Ok(())
    }

    pub fn shutdown(mut self) -> Result<()> {
        self.terminate()
    }

    fn launch(&self) -> Result<Link> {
        let (commands, command_rx) = bounded(self.config.queue_capacity);
        let (shutdown, shutdown_rx) = bounded(1);
        let context = EngineContext::new(self.factory.clone(), self.config.tick_period()?, self.events_tx.clone())
            .with_cancel(shutdown_rx.clone());

        let thread = thread::Builder::new()
            .name("springsim-context".into())
            .spawn(move || run_context(context, command_rx, shutdown_rx))?;

        Ok(Link { commands, shutdown, thread })
    }

    fn terminate(&mut self) -> Result<()> {
        if let Some(link) = self.link.take() {
            // disconnecting stays observable on every later check, unlike a consumed message
            drop(link.shutdown);
            drop(link.commands);
            link.thread.join().map_err(|_| SimError::Disconnected)?;
        }
        Ok(())
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}

/// Context thread body; returns once shut down or once every sender is gone
fn run_context(mut context: EngineContext, commands: Receiver<Command>, shutdown: Receiver<()>) {
    loop {
        if signalled(&shutdown) {
            break;
        }
        let timer = context.timer().cloned().unwrap_or_else(never);

        select! {
            recv(shutdown) -> _ => break,
            recv(commands) -> msg => match msg {
                Ok(command) => {
                    if signalled(&shutdown) {
                        break;
                    }
                    context.submit(command);
                }
                Err(_) => break,
            },
            recv(timer) -> _ => context.tick(),
        }
    }
    context.dispose();
}

fn signalled(shutdown: &Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::engine::SpringEngine;
    use crate::simulation::params::{Mode, Parameters};
    use crate::simulation::states::{PhysicalState, Vec2};
    use crate::worker::protocol::InitialState;
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(5);

    /// Receive events until `pred` matches or the deadline passes
    fn wait_for(handle: &SimulationHandle, mut pred: impl FnMut(&Event) -> bool) -> Vec<Event> {
        let deadline = Instant::now() + WAIT;
        let mut seen = Vec::new();
        while let Ok(event) = handle.events().recv_deadline(deadline) {
            let done = pred(&event);
            seen.push(event);
            if done {
                return seen;
            }
        }
        panic!("timed out, saw {:?}", seen);
    }

    #[test]
    fn steps_arrive_at_fixed_cadence_until_stopped() {
        let handle = SimulationHandle::spawn(RuntimeConfig::default()).unwrap();
        handle
            .submit(Command::Start {
                params: Parameters::default(),
                initial: InitialState { x: 1.2, ..Default::default() },
            })
            .unwrap();

        let events = wait_for(&handle, |e| matches!(e, Event::Step { time, .. } if *time > 4.5 / 120.0));
        assert!(events.iter().any(|e| matches!(e, Event::Started { .. })));

        handle.submit(Command::Stop).unwrap();
        wait_for(&handle, |e| matches!(e, Event::Stopped));
        handle.shutdown().unwrap();
    }

    #[test]
    fn commands_before_ready_apply_in_order() {
        let factory: Arc<dyn EngineFactory> = Arc::new(|| {
            thread::sleep(Duration::from_millis(50));
            SpringEngine::new(Parameters::default(), PhysicalState::default())
        });
        let handle = SimulationHandle::spawn_with(RuntimeConfig::default(), factory).unwrap();

        for k in [5.0, 20.0] {
            handle
                .submit(Command::UpdateParams { params: Parameters::new(1.0, k, 0.5, Mode::OneD), initial: None })
                .unwrap();
        }

        let mut omegas = Vec::new();
        wait_for(&handle, |e| {
            if let Event::ParamsUpdated { analytical } = e {
                omegas.push(analytical.omega_n());
            }
            omegas.len() == 2
        });
        assert!((omegas[1] - 20.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn hard_reset_returns_to_uninitialized() {
        let mut handle = SimulationHandle::spawn(RuntimeConfig::default()).unwrap();
        handle.submit(Command::SetPosition { position: Vec2::new(1.5, 0.0) }).unwrap();
        wait_for(&handle, |e| matches!(e, Event::AnalyticalUpdated { .. }));

        handle.hard_reset().unwrap();
        handle.submit(Command::Stop).unwrap();
        // a fresh context initializes again on its first command
        wait_for(&handle, |e| matches!(e, Event::Ready { .. }));
    }

    #[test]
    fn rejects_zero_rate() {
        let config = RuntimeConfig { tick_hz: 0.0, ..Default::default() };
        assert!(SimulationHandle::spawn(config).is_err());
    }

    #[test]
    fn rejects_rate_with_unrepresentable_period() {
        let config = RuntimeConfig { tick_hz: 1e-30, queue_capacity: 8 };
        assert!(matches!(SimulationHandle::spawn(config), Err(SimError::InvalidParameter(_))));
    }

    /// Engine that takes `ms` to build
    fn slow_factory(ms: u64) -> Arc<dyn EngineFactory> {
        Arc::new(move || {
            thread::sleep(Duration::from_millis(ms));
            SpringEngine::new(Parameters::default(), PhysicalState::default())
        })
    }

    #[test]
    fn hard_reset_discards_commands_queued_during_initialization() {
        let mut handle = SimulationHandle::spawn_with(RuntimeConfig::default(), slow_factory(200)).unwrap();
        for k in [5.0, 6.0, 7.0] {
            handle
                .submit(Command::UpdateParams { params: Parameters::new(1.0, k, 0.5, Mode::OneD), initial: None })
                .unwrap();
        }
        thread::sleep(Duration::from_millis(20));

        // joins the old context, so everything it emitted is already queued
        handle.hard_reset().unwrap();

        let leaked: Vec<Event> = handle
            .events()
            .try_iter()
            .filter(|e| matches!(e, Event::Ready { .. } | Event::ParamsUpdated { .. }))
            .collect();
        assert!(leaked.is_empty(), "old context emitted {:?}", leaked);
    }

    #[test]
    fn full_queue_reports_queue_full() {
        let config = RuntimeConfig { queue_capacity: 1, ..Default::default() };
        let handle = SimulationHandle::spawn_with(config, slow_factory(200)).unwrap();

        let results: Vec<Result<()>> = (0..4).map(|_| handle.submit(Command::Stop)).collect();
        assert!(results.iter().any(|r| matches!(r, Err(SimError::QueueFull))), "{:?}", results);
    }
}
