use std::collections::VecDeque;

use super::event::{Stage, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub sessions: u64,
    pub ticks: u64,
    pub turns: TurnStats,
    pub failures: FailureStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnStats {
    pub decisions: u64,
    pub executed: u64,
    pub knockouts: u64,
    pub discarded: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureStats {
    pub init: u64,
    pub status: u64,
    pub decide: u64,
    pub execute: u64,
    pub notify: u64,
}

impl FailureStats {
    pub fn total(&self) -> u64 {
        self.init + self.status + self.decide + self.execute + self.notify
    }
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    for event in events {
        accumulate(&mut snap, event);
    }
    snap
}

/// Folds one event into running totals.
pub fn accumulate(snap: &mut TelemetrySnapshot, event: &TelemetryEvent) {
    match event {
        TelemetryEvent::SessionStarted { .. } => snap.sessions += 1,
        TelemetryEvent::TickCompleted { decisions, executed, .. } => {
            snap.ticks += 1;
            snap.turns.decisions += u64::from(*decisions);
            snap.turns.executed += u64::from(*executed);
        }
        TelemetryEvent::KnockedOut { discarded, .. } => {
            snap.turns.knockouts += 1;
            snap.turns.discarded += *discarded as u64;
        }
        TelemetryEvent::CollaboratorFailed { stage, .. } => match stage {
            Stage::Init => snap.failures.init += 1,
            Stage::Status => snap.failures.status += 1,
            Stage::Decide => snap.failures.decide += 1,
            Stage::Execute => snap.failures.execute += 1,
            Stage::Notify => snap.failures.notify += 1,
        },
        TelemetryEvent::SessionHalted { .. } => {}
    }
}
