use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::body::ActorId;
use crate::kernel::time::Tick;

/// Which collaborator call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Init,
    Status,
    Decide,
    Execute,
    Notify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    SessionStarted {
        session: Uuid,
        bodies: usize,
    },

    TickCompleted {
        tick: Tick,
        decisions: u32,
        executed: u32,
    },

    KnockedOut {
        tick: Tick,
        actor: ActorId,
        discarded: usize,
    },

    /// `actor` is `None` for session-wide hooks that concern no single body.
    CollaboratorFailed {
        tick: Tick,
        actor: Option<ActorId>,
        stage: Stage,
    },

    SessionHalted {
        session: Uuid,
        ticks: u64,
    },
}
