pub mod commands;
pub mod config;
pub mod input;
pub mod kernel;
pub mod outputs;
pub mod planner;

// Re-export specific items if needed for convenient access
pub use kernel::scheduler::{Scheduler, SessionHandle, SessionState, TickOutcome};
