pub mod interpreter;

pub use interpreter::{CommandError, Interpreter, Verb};
