//! Builtin function registry
//!
//! A process-wide, read-only mapping from name to native function.
//! Builtins are consulted only after an identifier misses the whole
//! environment chain. Printing builtins write through a shared
//! [`OutputWriter`] so embedders and tests can capture program output.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::RuntimeError;
use crate::value::Value;

/// Shared, thread-safe output writer. Defaults to stdout.
pub type OutputWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Construct a writer that goes to real stdout (the default).
pub fn stdout_writer() -> OutputWriter {
    Arc::new(Mutex::new(Box::new(std::io::stdout())))
}

/// A builtin's native entry point: evaluated arguments, call line,
/// output writer
type BuiltinFn = fn(&[Value], u32, &OutputWriter) -> Result<Value, RuntimeError>;

/// A named native function
pub struct Builtin {
    /// Registry name, also used when the value is printed
    pub name: &'static str,
    func: BuiltinFn,
}

impl Builtin {
    /// Invoke the native function
    pub fn call(
        &self,
        args: &[Value],
        line: u32,
        output: &OutputWriter,
    ) -> Result<Value, RuntimeError> {
        (self.func)(args, line, output)
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

/// Construct an arity error for a builtin
fn arity_error(name: &str, expected: &str, actual: usize, line: u32) -> RuntimeError {
    RuntimeError::Builtin {
        message: format!("{}() inahitaji hoja {}, imepewa {}", name, expected, actual),
        line,
    }
}

static REGISTRY: OnceLock<HashMap<&'static str, Builtin>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, Builtin> {
    REGISTRY.get_or_init(|| {
        let mut m = HashMap::new();

        m.insert(
            "andika",
            Builtin {
                name: "andika",
                func: builtin_andika,
            },
        );
        m.insert(
            "urefu",
            Builtin {
                name: "urefu",
                func: builtin_urefu,
            },
        );
        m.insert(
            "aina",
            Builtin {
                name: "aina",
                func: builtin_aina,
            },
        );
        m.insert(
            "jaza",
            Builtin {
                name: "jaza",
                func: builtin_jaza,
            },
        );

        m
    })
}

/// Look up a builtin by name
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    registry().get(name)
}

/// `andika(...)` — print arguments space-separated, with a trailing
/// newline
fn builtin_andika(args: &[Value], _line: u32, output: &OutputWriter) -> Result<Value, RuntimeError> {
    let rendered: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let mut out = output.lock().expect("output writer poisoned");
    let _ = writeln!(out, "{}", rendered.join(" "));
    let _ = out.flush();
    Ok(Value::Null)
}

/// `urefu(x)` — length of a string (characters), array, or dict
fn builtin_urefu(args: &[Value], line: u32, _output: &OutputWriter) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(arity_error("urefu", "1", args.len(), line));
    }
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::Array(elements) => Ok(Value::Int(elements.borrow().len() as i64)),
        Value::Dict(pairs) => Ok(Value::Int(pairs.borrow().len() as i64)),
        other => Err(RuntimeError::Builtin {
            message: format!("urefu() haifanyi kazi na {}", other.type_name()),
            line,
        }),
    }
}

/// `aina(x)` — the value's type tag as a string
fn builtin_aina(args: &[Value], line: u32, _output: &OutputWriter) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(arity_error("aina", "1", args.len(), line));
    }
    Ok(Value::string(args[0].type_name()))
}

/// `jaza(prompt?)` — read one line from stdin, trailing newline
/// stripped
fn builtin_jaza(args: &[Value], line: u32, output: &OutputWriter) -> Result<Value, RuntimeError> {
    if args.len() > 1 {
        return Err(arity_error("jaza", "0 au 1", args.len(), line));
    }
    if let Some(prompt) = args.first() {
        let mut out = output.lock().expect("output writer poisoned");
        let _ = write!(out, "{}", prompt);
        let _ = out.flush();
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|err| RuntimeError::Builtin {
            message: format!("jaza() imeshindwa kusoma: {}", err),
            line,
        })?;
    while buffer.ends_with('\n') || buffer.ends_with('\r') {
        buffer.pop();
    }
    Ok(Value::string(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> (OutputWriter, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));

        struct Sink(Arc<Mutex<Vec<u8>>>);
        impl Write for Sink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().expect("sink poisoned").extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let writer: OutputWriter = Arc::new(Mutex::new(Box::new(Sink(Arc::clone(&buffer)))));
        (writer, buffer)
    }

    #[test]
    fn test_lookup() {
        assert!(lookup("andika").is_some());
        assert!(lookup("urefu").is_some());
        assert!(lookup("aina").is_some());
        assert!(lookup("jaza").is_some());
        assert!(lookup("haipo").is_none());
    }

    #[test]
    fn test_andika_joins_with_spaces() {
        let (writer, buffer) = capture();
        let args = vec![Value::Int(1), Value::string("na"), Value::Int(2)];
        let result = lookup("andika").unwrap().call(&args, 1, &writer).unwrap();
        assert_eq!(result, Value::Null);
        let printed = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert_eq!(printed, "1 na 2\n");
    }

    #[test]
    fn test_urefu() {
        let (writer, _) = capture();
        let urefu = lookup("urefu").unwrap();
        assert_eq!(
            urefu.call(&[Value::string("habari")], 1, &writer).unwrap(),
            Value::Int(6)
        );
        let arr = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(urefu.call(&[arr], 1, &writer).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_urefu_rejects_numbers() {
        let (writer, _) = capture();
        let err = lookup("urefu")
            .unwrap()
            .call(&[Value::Int(5)], 3, &writer)
            .unwrap_err();
        assert_eq!(err.to_string(), "Mstari 3: urefu() haifanyi kazi na NAMBA");
    }

    #[test]
    fn test_urefu_arity() {
        let (writer, _) = capture();
        let err = lookup("urefu").unwrap().call(&[], 2, &writer).unwrap_err();
        assert_eq!(err.to_string(), "Mstari 2: urefu() inahitaji hoja 1, imepewa 0");
    }

    #[test]
    fn test_aina() {
        let (writer, _) = capture();
        let aina = lookup("aina").unwrap();
        assert_eq!(
            aina.call(&[Value::Int(5)], 1, &writer).unwrap(),
            Value::string("NAMBA")
        );
        assert_eq!(
            aina.call(&[Value::Null], 1, &writer).unwrap(),
            Value::string("TUPU")
        );
    }
}
