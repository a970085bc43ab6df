use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{accumulate, TelemetrySnapshot};

const MAX_EVENTS: usize = 10_000;

/// Bounded event log. Oldest events fall off once the buffer is full; the
/// running totals behind [`TelemetryRecorder::snapshot`] do not.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
    totals: TelemetrySnapshot,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
            totals: TelemetrySnapshot::default(),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        accumulate(&mut self.totals, &event);
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    /// The most recent events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Totals over everything recorded since the last `clear`, including
    /// events already evicted from the buffer.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.totals.clone()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.totals = TelemetrySnapshot::default();
    }
}
