pub mod grudge;
pub mod stub;

pub use grudge::{Grudge, GrudgeBrain};
pub use stub::IdleBrain;
