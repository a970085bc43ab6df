use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session termination flag.
///
/// Any holder may raise it (a command handler, a UI trigger, another task).
/// The scheduler only observes it at the top of a tick, so a stop never tears
/// a pass in half.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Only the scheduler clears the flag, when a fresh session starts.
    pub(crate) fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}
