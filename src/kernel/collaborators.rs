//! Capabilities the kernel invokes but does not implement.
//!
//! Presenting state, deciding what an AI body wants and interpreting a command
//! string all live behind these traits. Every call returns `anyhow::Result`;
//! the turn processor treats an `Err` (or a panic) as a local failure of that
//! one call and moves on.

use super::body::{ActorId, Body};
use super::cancel::StopSignal;
use super::roster::Roster;
use super::time::Tick;

/// Output surface: how status and events reach the human.
pub trait Presenter: Send {
    /// Called by `Scheduler::start` before the roster's first tick. Anything
    /// remembered from an earlier session must be forgotten here.
    fn begin_session(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for the player once per tick, knocked out or not.
    fn display_status(&mut self, body: &Body) -> anyhow::Result<()>;

    fn notify(&mut self, actor: &ActorId, message: &str) -> anyhow::Result<()>;
}

/// Decision logic for AI-controlled bodies.
pub trait Brain: Send {
    /// Called by `Scheduler::start` before any `init`.
    fn begin_session(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Once per AI body at session start, before the first tick.
    fn init(&mut self, body: &mut Body) -> anyhow::Result<()>;

    /// Once per tick for each AI body that is still active.
    fn decide(&mut self, actor: &ActorId, ctx: &mut TurnContext<'_>) -> anyhow::Result<()>;
}

/// Interprets a popped command string for the body that issued it.
pub trait CommandHandler: Send {
    fn execute(
        &mut self,
        actor: &ActorId,
        command: &str,
        ctx: &mut TurnContext<'_>,
    ) -> anyhow::Result<()>;
}

/// A message a collaborator wants shown, addressed to a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub actor: ActorId,
    pub message: String,
}

/// What a collaborator may touch while a tick is in flight.
pub struct TurnContext<'a> {
    pub tick: Tick,
    pub roster: &'a mut Roster,
    stop: &'a StopSignal,
    notices: Vec<Notice>,
}

impl<'a> TurnContext<'a> {
    pub fn new(tick: Tick, roster: &'a mut Roster, stop: &'a StopSignal) -> Self {
        Self { tick, roster, stop, notices: Vec::new() }
    }

    /// Queued and forwarded to the presenter once the current call returns.
    pub fn notify(&mut self, actor: &ActorId, message: impl Into<String>) {
        self.notices.push(Notice { actor: actor.clone(), message: message.into() });
    }

    /// Ends the session at the next tick boundary.
    pub fn request_stop(&self) {
        self.stop.request();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    pub(crate) fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// The three collaborators a scheduler drives.
pub struct Collaborators {
    pub presenter: Box<dyn Presenter>,
    pub brain: Box<dyn Brain>,
    pub commands: Box<dyn CommandHandler>,
}

impl Collaborators {
    pub fn new(
        presenter: impl Presenter + 'static,
        brain: impl Brain + 'static,
        commands: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            presenter: Box::new(presenter),
            brain: Box::new(brain),
            commands: Box::new(commands),
        }
    }
}
