//! Tree-walking evaluator
//!
//! Direct AST evaluation against a lexically-scoped environment chain.
//! Every evaluation step yields a [`Flow`]: either a plain value or one
//! of the non-local control-flow sentinels. Errors travel in the `Err`
//! channel and short-circuit through `?`; sentinels travel in the `Ok`
//! channel so blocks can hand them to the enclosing loop or call
//! unchanged.

mod expr;
mod stmt;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Program;
use crate::builtins::{stdout_writer, OutputWriter};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::value::Value;

/// Outcome of evaluating a single node
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    /// Ordinary value
    Value(Value),
    /// `rudisha` unwinding toward the nearest call boundary
    Return(Value),
    /// `vunja` unwinding toward the nearest absorbing loop
    Break,
    /// `endelea` advancing the nearest loop
    Continue,
}

/// Evaluator state
pub struct Evaluator {
    /// Writer used by printing builtins
    output: OutputWriter,
}

impl Evaluator {
    /// Create an evaluator that prints to stdout
    pub fn new() -> Self {
        Self {
            output: stdout_writer(),
        }
    }

    /// Create an evaluator with a custom output writer (used by the
    /// REPL and by tests to capture program output)
    pub fn with_output(output: OutputWriter) -> Self {
        Self { output }
    }

    /// Evaluate a program in the given environment.
    ///
    /// Statements run in order; a `rudisha` at program level yields its
    /// unwrapped payload, and the program's value is otherwise that of
    /// the last statement.
    pub fn eval_program(
        &mut self,
        program: &Program,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let mut result = Value::Null;

        for statement in &program.statements {
            match self.eval_statement(statement, env)? {
                Flow::Value(value) => result = value,
                Flow::Return(value) => return Ok(value),
                // A stray `vunja`/`endelea` has no loop left to act on
                Flow::Break | Flow::Continue => result = Value::Null,
            }
        }

        Ok(result)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
