pub mod context;
mod tree;

use crate::parser::Program;
use crate::value::{error::RuntimeError, Value};
use context::StdioContext;
pub use tree::TreeWalkInterpreter;

/// Outcome of running a statement.
#[derive(Debug)]
pub enum ProgramState {
    /// Execution continues. Holds the value the statement produced.
    Run(Value),
    /// A `return` is unwinding to the nearest function call.
    Return(Value),
}

pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

/// Runs a program in a fresh global scope, printing to standard output.
pub fn evaluate(program: &Program) -> Result<Value, RuntimeError> {
    let mut interpreter = TreeWalkInterpreter::new(StdioContext);
    interpreter.run(program)
}
