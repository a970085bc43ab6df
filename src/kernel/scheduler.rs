use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::body::ActorId;
use super::cancel::StopSignal;
use super::collaborators::{Collaborators, TurnContext};
use super::roster::{Roster, RosterError};
use super::telemetry::event::{Stage, TelemetryEvent};
use super::telemetry::metrics::TelemetrySnapshot;
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Tick;
use super::turn::{contain, TurnProcessor, TurnReport};
use crate::config::{ConfigError, SchedulerConfig};
use crate::input::{self, InputClosed, InputReceiver, InputSender};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("session already running")]
    AlreadyRunning,

    #[error("no session running")]
    NotRunning,

    #[error("failed to build roster")]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Running,
}

/// What one scheduled invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session is running.
    Idle,
    /// One full turn pass ran.
    Advanced(TurnReport),
    /// The stop flag was seen; the session is gone and no pass ran.
    Halted(SessionSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session: Uuid,
    pub ticks: u64,
    pub telemetry: TelemetrySnapshot,
}

struct Session {
    id: Uuid,
    roster: Roster,
    tick: Tick,
}

/// Cloneable control surface for code that does not own the scheduler: a
/// stdin reader, a UI button, another task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    stop: StopSignal,
    running: Arc<AtomicBool>,
    input: InputSender,
}

impl SessionHandle {
    pub fn stop(&self) {
        self.stop.request();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Forwards a raw line to the player's queue at the next tick.
    pub fn submit(&self, raw: &str) -> Result<bool, InputClosed> {
        self.input.submit(raw)
    }
}

/// Owns the roster for the lifetime of a session and drives the turn
/// processor at a fixed cadence.
///
/// `Stopped -> Running` via [`Scheduler::start`], `Running -> Stopped` when a
/// tick observes the stop flag. Every tick goes through `&mut self`, so two
/// passes can never overlap.
pub struct Scheduler {
    config: SchedulerConfig,
    collaborators: Collaborators,
    telemetry: TelemetryRecorder,
    stop: StopSignal,
    running: Arc<AtomicBool>,
    input_tx: InputSender,
    input_rx: InputReceiver,
    session: Option<Session>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, collaborators: Collaborators) -> Self {
        let (input_tx, input_rx) = input::channel();
        Self {
            config,
            collaborators,
            telemetry: TelemetryRecorder::new(),
            stop: StopSignal::new(),
            running: Arc::new(AtomicBool::new(false)),
            input_tx,
            input_rx,
            session: None,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            stop: self.stop.clone(),
            running: self.running.clone(),
            input: self.input_tx.clone(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The cadence is fixed for a session, so config only changes while
    /// stopped.
    pub fn set_config(&mut self, config: SchedulerConfig) -> Result<(), SchedulerError> {
        if self.session.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn tick(&self) -> Option<Tick> {
        self.session.as_ref().map(|s| s.tick)
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.session.as_ref().map(|s| &s.roster)
    }

    /// Direct access between ticks, for harnesses that seed queues or health
    /// without going through input. Holding `&mut self` means no pass is in
    /// flight. Live callers should use [`SessionHandle::submit`].
    #[doc(hidden)]
    pub fn roster_mut(&mut self) -> Option<&mut Roster> {
        self.session.as_mut().map(|s| &mut s.roster)
    }

    pub fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    /// Raises the stop flag. The next tick finalizes the halt.
    pub fn stop(&self) {
        self.stop.request();
    }

    /// Builds a fresh roster, initializes every AI body and enters `Running`.
    pub fn start(&mut self) -> Result<Uuid, SchedulerError> {
        if let Some(session) = &self.session {
            warn!(session = %session.id, "start rejected, session already running");
            return Err(SchedulerError::AlreadyRunning);
        }

        self.config.validate()?;
        let mut roster = Roster::build(&self.config.bodies)?;

        self.stop.reset();
        self.telemetry.clear();
        let stale = self.input_rx.drain();
        if !stale.is_empty() {
            debug!(dropped = stale.len(), "dropping input submitted while stopped");
        }

        let presenter = &mut self.collaborators.presenter;
        if let Err(err) = contain(|| presenter.begin_session()) {
            warn!(error = %err, "presenter reset failed");
            self.record_init_failure(None);
        }
        let brain = &mut self.collaborators.brain;
        if let Err(err) = contain(|| brain.begin_session()) {
            warn!(error = %err, "brain reset failed");
            self.record_init_failure(None);
        }

        for body in roster.iter_mut().filter(|b| !b.is_player()) {
            let brain = &mut self.collaborators.brain;
            if let Err(err) = contain(|| brain.init(body)) {
                warn!(actor = %body.id(), error = %err, "AI init failed");
                self.record_init_failure(Some(body.id().clone()));
            }
        }

        let id = Uuid::new_v4();
        self.telemetry.record(TelemetryEvent::SessionStarted {
            session: id,
            bodies: roster.len(),
        });
        info!(
            session = %id,
            bodies = roster.len(),
            tick_ms = self.config.tick_ms,
            "session started"
        );

        self.session = Some(Session {
            id,
            roster,
            tick: Tick::new(),
        });
        self.running.store(true, Ordering::SeqCst);
        Ok(id)
    }

    /// One scheduled invocation: halt if asked to, otherwise feed pending
    /// input to the player and run a full turn pass.
    pub fn step(&mut self) -> TickOutcome {
        if self.stop.is_requested() {
            if let Some(session) = self.session.take() {
                return TickOutcome::Halted(self.finish(session));
            }
        }

        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };

        session.tick = session.tick.next();
        for line in self.input_rx.drain() {
            session.roster.player_mut().enqueue_command(line);
        }

        let mut ctx = TurnContext::new(session.tick, &mut session.roster, &self.stop);
        let mut processor = TurnProcessor::new(&mut self.collaborators, &mut self.telemetry);
        let report = processor.resolve(&mut ctx);
        TickOutcome::Advanced(report)
    }

    /// Starts a session and ticks it until it halts.
    pub async fn run(&mut self) -> Result<SessionSummary, SchedulerError> {
        self.start()?;
        self.run_started().await
    }

    /// Timer loop for a session that is already running. A tick that fires
    /// while the previous pass is still executing is skipped, not queued.
    pub async fn run_started(&mut self) -> Result<SessionSummary, SchedulerError> {
        if self.session.is_none() {
            return Err(SchedulerError::NotRunning);
        }

        let mut cadence = interval(self.config.tick_interval());
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            cadence.tick().await;
            match self.step() {
                TickOutcome::Advanced(_) => {}
                TickOutcome::Halted(summary) => return Ok(summary),
                TickOutcome::Idle => return Err(SchedulerError::NotRunning),
            }
        }
    }

    fn record_init_failure(&mut self, actor: Option<ActorId>) {
        self.telemetry.record(TelemetryEvent::CollaboratorFailed {
            tick: Tick::new(),
            actor,
            stage: Stage::Init,
        });
    }

    fn finish(&mut self, session: Session) -> SessionSummary {
        self.running.store(false, Ordering::SeqCst);
        self.telemetry.record(TelemetryEvent::SessionHalted {
            session: session.id,
            ticks: session.tick.frame,
        });
        info!(session = %session.id, ticks = session.tick.frame, "session halted");

        SessionSummary {
            session: session.id,
            ticks: session.tick.frame,
            telemetry: self.telemetry.snapshot(),
        }
    }
}
