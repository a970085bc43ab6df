use serde::{Deserialize, Serialize};

/// Logical turn clock. One frame per scheduled Turn Processor pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick {
    pub frame: u64,
}

/// Reference cadence between two scheduled ticks.
pub const TICK_MS: u64 = 100;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }
}
