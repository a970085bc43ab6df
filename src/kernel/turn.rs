use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use tracing::{debug, info, warn};

use super::body::{ActorId, Body, Role};
use super::collaborators::{Collaborators, TurnContext};
use super::telemetry::event::{Stage, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Tick;

/// Message sent to a knocked-out body whose backlog gets dropped.
pub const KNOCKED_OUT: &str = "Knocked out!";

/// Counts of what one pass did. Purely informational.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub tick: Tick,
    pub status_shown: u32,
    pub decisions: u32,
    pub executed: u32,
    pub knockouts: u32,
    pub discarded: usize,
    pub failures: u32,
}

/// Resolves one logical turn for every body in the roster.
///
/// Per body, in roster order:
/// 1. observation: the player is always shown its status, an active AI body
///    gets one decision, a knocked-out AI body is skipped;
/// 2. command resolution: an active body runs at most its queue head, a
///    knocked-out body loses its entire queue and gets a knockout notice.
///
/// Health is read at the moment each phase runs, so a body downed earlier in
/// the same pass is already treated as knocked out.
pub struct TurnProcessor<'a> {
    collaborators: &'a mut Collaborators,
    telemetry: &'a mut TelemetryRecorder,
}

impl<'a> TurnProcessor<'a> {
    pub fn new(collaborators: &'a mut Collaborators, telemetry: &'a mut TelemetryRecorder) -> Self {
        Self { collaborators, telemetry }
    }

    pub fn resolve(&mut self, ctx: &mut TurnContext<'_>) -> TurnReport {
        let mut report = TurnReport { tick: ctx.tick, ..TurnReport::default() };

        for idx in 0..ctx.roster.len() {
            let Some(body) = ctx.roster.at(idx) else { continue };
            let actor = body.id().clone();
            let role = body.role();

            self.observe(idx, &actor, role, ctx, &mut report);
            self.resolve_command(idx, &actor, ctx, &mut report);
        }

        self.telemetry.record(TelemetryEvent::TickCompleted {
            tick: ctx.tick,
            decisions: report.decisions,
            executed: report.executed,
        });

        report
    }

    fn observe(
        &mut self,
        idx: usize,
        actor: &ActorId,
        role: Role,
        ctx: &mut TurnContext<'_>,
        report: &mut TurnReport,
    ) {
        match role {
            Role::Player => {
                let Some(body) = ctx.roster.at(idx) else { return };
                let presenter = &mut self.collaborators.presenter;
                let outcome = contain(|| presenter.display_status(body));
                report.status_shown += 1;
                self.check(ctx.tick, actor, Stage::Status, outcome, report);
            }
            Role::AiControlled => {
                if !ctx.roster.at(idx).is_some_and(Body::is_active) {
                    debug!(tick = ctx.tick.frame, %actor, "knocked out, skipping decision");
                    return;
                }
                let brain = &mut self.collaborators.brain;
                let outcome = contain(|| brain.decide(actor, &mut *ctx));
                report.decisions += 1;
                self.check(ctx.tick, actor, Stage::Decide, outcome, report);
                self.flush_notices(ctx, report);
            }
        }
    }

    fn resolve_command(
        &mut self,
        idx: usize,
        actor: &ActorId,
        ctx: &mut TurnContext<'_>,
        report: &mut TurnReport,
    ) {
        let Some(body) = ctx.roster.at_mut(idx) else { return };
        if !body.has_pending_command() {
            return;
        }

        if body.is_active() {
            let Some(command) = body.pop_command() else { return };
            debug!(tick = ctx.tick.frame, %actor, "executing command");
            let commands = &mut self.collaborators.commands;
            let outcome = contain(|| commands.execute(actor, &command, &mut *ctx));
            report.executed += 1;
            self.check(ctx.tick, actor, Stage::Execute, outcome, report);
            self.flush_notices(ctx, report);
        } else {
            let discarded = body.discard_all_commands();
            report.knockouts += 1;
            report.discarded += discarded;
            info!(
                tick = ctx.tick.frame,
                %actor,
                discarded,
                "knocked out, dropping queued commands"
            );
            self.telemetry.record(TelemetryEvent::KnockedOut {
                tick: ctx.tick,
                actor: actor.clone(),
                discarded,
            });

            let presenter = &mut self.collaborators.presenter;
            let outcome = contain(|| presenter.notify(actor, KNOCKED_OUT));
            self.check(ctx.tick, actor, Stage::Notify, outcome, report);
        }
    }

    fn flush_notices(&mut self, ctx: &mut TurnContext<'_>, report: &mut TurnReport) {
        for notice in ctx.take_notices() {
            let presenter = &mut self.collaborators.presenter;
            let outcome = contain(|| presenter.notify(&notice.actor, &notice.message));
            self.check(ctx.tick, &notice.actor, Stage::Notify, outcome, report);
        }
    }

    fn check(
        &mut self,
        tick: Tick,
        actor: &ActorId,
        stage: Stage,
        outcome: anyhow::Result<()>,
        report: &mut TurnReport,
    ) {
        if let Err(err) = outcome {
            warn!(
                tick = tick.frame,
                %actor,
                ?stage,
                error = %err,
                "collaborator failed, continuing tick"
            );
            report.failures += 1;
            self.telemetry.record(TelemetryEvent::CollaboratorFailed {
                tick,
                actor: Some(actor.clone()),
                stage,
            });
        }
    }
}

/// Runs a collaborator call, turning a panic into an ordinary error so one
/// misbehaving call cannot take the rest of the tick down with it.
pub(crate) fn contain<F>(call: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!(
            "collaborator panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}
