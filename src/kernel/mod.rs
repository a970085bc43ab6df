pub mod body;
pub mod cancel;
pub mod collaborators;
pub mod roster;
pub mod scheduler;
pub mod telemetry;
pub mod time;
pub mod turn;
