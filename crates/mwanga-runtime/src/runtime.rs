//! Embedding API
//!
//! [`Mwanga`] ties the pipeline together: lex, parse, evaluate against
//! a persistent root environment. Repeated `eval` calls share that
//! environment, which is what a REPL driver wants — an error leaves
//! earlier bindings intact.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::builtins::OutputWriter;
use crate::environment::Environment;
use crate::error::{ParseError, RuntimeError};
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;

/// Evaluation error: either the collected parse errors or a runtime
/// error
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("{}", render_parse_errors(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn render_parse_errors(errors: &[ParseError]) -> String {
    let rendered: Vec<String> = errors.iter().map(|error| error.to_string()).collect();
    rendered.join("\n")
}

/// Mwanga runtime instance
///
/// # Examples
///
/// ```
/// use mwanga_runtime::{Mwanga, Value};
///
/// let runtime = Mwanga::new();
/// let result = runtime.eval("fanya a = 5; a + 3").unwrap();
/// assert_eq!(result, Value::Int(8));
/// ```
pub struct Mwanga {
    evaluator: RefCell<Evaluator>,
    env: Rc<RefCell<Environment>>,
}

impl Mwanga {
    /// Create a runtime whose builtins print to stdout
    pub fn new() -> Self {
        Self {
            evaluator: RefCell::new(Evaluator::new()),
            env: Rc::new(RefCell::new(Environment::new())),
        }
    }

    /// Create a runtime with a custom output writer for printing
    /// builtins
    pub fn with_output(output: OutputWriter) -> Self {
        Self {
            evaluator: RefCell::new(Evaluator::with_output(output)),
            env: Rc::new(RefCell::new(Environment::new())),
        }
    }

    /// Evaluate Mwanga source code against this instance's root
    /// environment
    pub fn eval(&self, source: &str) -> Result<Value, Error> {
        let tokens = Lexer::new(source).tokenize();
        let (program, errors) = Parser::new(tokens).parse();
        if !errors.is_empty() {
            return Err(Error::Parse(errors));
        }

        self.evaluator
            .borrow_mut()
            .eval_program(&program, &self.env)
            .map_err(Error::from)
    }
}

impl Default for Mwanga {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_expression() {
        let runtime = Mwanga::new();
        assert_eq!(runtime.eval("1 + 2").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_bindings_persist_across_eval_calls() {
        let runtime = Mwanga::new();
        runtime.eval("fanya idadi = 41").unwrap();
        assert_eq!(runtime.eval("idadi + 1").unwrap(), Value::Int(42));
    }

    #[test]
    fn test_error_leaves_environment_intact() {
        let runtime = Mwanga::new();
        runtime.eval("fanya idadi = 1").unwrap();
        assert!(runtime.eval("haipo").is_err());
        assert_eq!(runtime.eval("idadi").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let runtime = Mwanga::new();
        let err = runtime.eval("fanya = ;").unwrap_err();
        match err {
            Error::Parse(errors) => assert!(!errors.is_empty()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_runtime_error_display() {
        let runtime = Mwanga::new();
        let err = runtime.eval("5(1)").unwrap_err();
        assert_eq!(err.to_string(), "Mstari 1: Hii sio function: NAMBA");
    }
}
