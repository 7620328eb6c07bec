//! Runtime value representation
//!
//! - Integers, floats, booleans, null: immediate values
//! - Strings: heap-allocated, reference-counted (`Rc<String>`), immutable
//! - Arrays and dicts: reference-counted, mutable through `RefCell`
//! - Functions: closures carrying their defining environment
//!
//! Booleans and null are plain enum variants, so `kweli`, `sikweli` and
//! `tupu` are canonical by construction; equality on them is value
//! equality. Heap values (arrays, dicts, functions) compare by
//! reference identity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::builtins::Builtin;
use crate::environment::Environment;

/// Runtime value type
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit IEEE-754 float
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Immutable string
    Str(Rc<String>),
    /// Ordered, mutable, heterogeneous sequence
    Array(Rc<RefCell<Vec<Value>>>),
    /// Hashable-keyed map; each slot keeps the original key value
    Dict(Rc<RefCell<HashMap<HashKey, DictPair>>>),
    /// Null
    Null,
    /// User-defined closure
    Function(Rc<Function>),
    /// Native function from the builtin registry
    Builtin(&'static Builtin),
}

/// A closure: parameter names, body, and the environment captured at
/// creation time
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<Block>,
    pub env: Rc<RefCell<Environment>>,
}

/// A dict slot: the original key value alongside the stored value
#[derive(Debug, Clone, PartialEq)]
pub struct DictPair {
    pub key: Value,
    pub value: Value,
}

/// Hash key derived from a hashable value's tag and content.
///
/// Integers, floats, booleans and strings are hashable; floats hash by
/// their bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(Rc<String>),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::new(s.into()))
    }

    /// Create a new array value
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(values)))
    }

    /// Create a new dict value
    pub fn dict(pairs: HashMap<HashKey, DictPair>) -> Self {
        Value::Dict(Rc::new(RefCell::new(pairs)))
    }

    /// The value's type tag, as used in diagnostics and `badili`
    /// clause matching
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "NAMBA",
            Value::Float(_) => "DESIMALI",
            Value::Bool(_) => "BOOLEAN",
            Value::Str(_) => "NENO",
            Value::Array(_) => "ORODHA",
            Value::Dict(_) => "KAMUSI",
            Value::Null => "TUPU",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
        }
    }

    /// Truthiness: null and `sikweli` are false, everything else is
    /// true (including zero and empty collections)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// The hash key for a hashable value, or `None` for unhashable
    /// kinds
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(n) => Some(HashKey::Int(*n)),
            Value::Float(f) => Some(HashKey::Float(f.to_bits())),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::Str(s) => Some(HashKey::Str(Rc::clone(s))),
            _ => None,
        }
    }

    /// An iterator over this value's `(key, value)` entries, or `None`
    /// if the value is not iterable.
    ///
    /// Arrays yield `(index, element)`, strings `(index, one-character
    /// string)`, dicts `(key, value)` in unspecified order. The entry
    /// list is snapshotted when the iterator is created.
    pub fn entries(&self) -> Option<EntryIter> {
        let entries: Vec<(Value, Value)> = match self {
            Value::Array(elements) => elements
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, element)| (Value::Int(i as i64), element.clone()))
                .collect(),
            Value::Str(s) => s
                .chars()
                .enumerate()
                .map(|(i, c)| (Value::Int(i as i64), Value::string(c.to_string())))
                .collect(),
            Value::Dict(pairs) => pairs
                .borrow()
                .values()
                .map(|pair| (pair.key.clone(), pair.value.clone()))
                .collect(),
            _ => return None,
        };
        Some(EntryIter { entries, pos: 0 })
    }
}

/// The iterable capability: `next()` yields `(key, value)` pairs,
/// `reset()` rewinds to the first entry
#[derive(Debug)]
pub struct EntryIter {
    entries: Vec<(Value, Value)>,
    pos: usize,
}

impl EntryIter {
    /// The next `(key, value)` entry, or `None` when exhausted
    pub fn next(&mut self) -> Option<(Value, Value)> {
        let entry = self.entries.get(self.pos).cloned();
        if entry.is_some() {
            self.pos += 1;
        }
        entry
    }

    /// Rewind to the first entry
    pub fn reset(&mut self) {
        self.pos = 0;
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            // Heap values compare by reference identity
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(true) => write!(f, "kweli"),
            Value::Bool(false) => write!(f, "sikweli"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                let rendered: Vec<String> =
                    elements.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Dict(pairs) => {
                let rendered: Vec<String> = pairs
                    .borrow()
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Value::Null => write!(f, "tupu"),
            Value::Function(func) => write!(f, "unda({})", func.parameters.join(", ")),
            Value::Builtin(builtin) => write!(f, "{}()", builtin.name),
        }
    }
}
