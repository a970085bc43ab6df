//! Session telemetry.
//!
//! Telemetry is write-only from the kernel's point of view: nothing in turn
//! resolution reads it back. It exists for observability and for tests that
//! check what a session did.
//!
//! Events carry ids, ticks and counts. Command text never enters telemetry.

pub mod event;
pub mod metrics;
pub mod recorder;
