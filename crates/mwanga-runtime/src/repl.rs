//! REPL core
//!
//! [`ReplSession`] keeps one runtime (and so one root environment)
//! alive across lines and captures everything printing builtins write,
//! so the line editor in the CLI decides how to render values, output,
//! and errors.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::builtins::OutputWriter;
use crate::runtime::{Error, Mwanga};
use crate::value::Value;

/// Result of evaluating one REPL line
#[derive(Debug)]
pub struct ReplResult {
    /// The line's value, when evaluation succeeded
    pub value: Option<Value>,
    /// The error, when it did not
    pub error: Option<Error>,
    /// Everything builtins printed while the line ran
    pub output: String,
}

/// Writer that appends to a shared byte buffer
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("repl buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// An interactive session with persistent state
pub struct ReplSession {
    runtime: Mwanga,
    writer: OutputWriter,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl ReplSession {
    /// Create a fresh session
    pub fn new() -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer: OutputWriter =
            Arc::new(Mutex::new(Box::new(SharedBuffer(Arc::clone(&buffer)))));
        Self {
            runtime: Mwanga::with_output(Arc::clone(&writer)),
            writer,
            buffer,
        }
    }

    /// Evaluate one line in the session's environment
    pub fn eval_line(&mut self, line: &str) -> ReplResult {
        let result = self.runtime.eval(line);
        let output = self.drain_output();

        match result {
            Ok(value) => ReplResult {
                value: Some(value),
                error: None,
                output,
            },
            Err(error) => ReplResult {
                value: None,
                error: Some(error),
                output,
            },
        }
    }

    /// Drop all bindings, keeping the output writer
    pub fn reset(&mut self) {
        self.runtime = Mwanga::with_output(Arc::clone(&self.writer));
    }

    fn drain_output(&mut self) -> String {
        let mut buffer = self.buffer.lock().expect("repl buffer poisoned");
        let output = String::from_utf8_lossy(&buffer).into_owned();
        buffer.clear();
        output
    }
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}
