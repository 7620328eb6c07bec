//! Runtime error catalog
//!
//! Errors are values: every evaluation step returns `Result` and
//! callers short-circuit with `?`. The rendered messages are the
//! language's Swahili diagnostics, prefixed with `Mstari <n>:` (the
//! source line) where one is available.

use thiserror::Error;

use crate::ast::{InfixOp, PrefixOp};

/// Runtime error raised by the evaluator or a builtin
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// Prefix operator applied to an unsupported operand
    #[error("Mstari {line}: Operesheni haieleweki: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOp,
        operand: &'static str,
        line: u32,
    },

    /// Infix operator not defined for this operand shape
    #[error("Mstari {line}: Operesheni Haielweki: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        operator: InfixOp,
        right: &'static str,
        line: u32,
    },

    /// Operand types differ and no cross-type rule applies
    #[error("Mstari {line}: Aina Hazilingani: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: InfixOp,
        right: &'static str,
        line: u32,
    },

    /// Identifier not bound in any scope nor in the builtin registry
    #[error("Mstari {line}: Neno Halifahamiki: {name}")]
    UnknownIdentifier { name: String, line: u32 },

    /// Call target is neither a function nor a builtin
    #[error("Mstari {line}: Hii sio function: {type_name}")]
    NotAFunction { type_name: &'static str, line: u32 },

    /// Array assignment past the end of the array
    #[error("Index imezidi idadi ya elements")]
    IndexOutOfRange,

    /// Dict literal key is not hashable
    #[error("Mstari {line}: Hashing imeshindikana: {type_name}")]
    UnhashableKey { type_name: &'static str, line: u32 },

    /// Dict index or containment probe is not hashable
    #[error("Mstari {line}: Samahani, {type_name} haitumiki kama key")]
    InvalidKey { type_name: &'static str, line: u32 },

    /// `kwa` target does not support iteration
    #[error("Mstari {line}: Huwezi kufanya operesheni hii na {type_name}")]
    NotIterable { type_name: &'static str, line: u32 },

    /// Array read with a non-integer index
    #[error("Mstari {line}: Tafadhali tumia number, sio: {type_name}")]
    InvalidArrayIndex { type_name: &'static str, line: u32 },

    /// Index operator on a value that is neither array nor dict
    #[error("Mstari {line}: Operesheni hii haiwezekani kwa: {type_name}")]
    NotIndexable { type_name: &'static str, line: u32 },

    /// Assignment target is neither an identifier nor an index
    /// expression
    #[error("Mstari {line}: Tumia neno kama variable, sio {type_name}")]
    InvalidAssignmentTarget { type_name: &'static str, line: u32 },

    /// Index assignment on a value that is neither array nor dict
    #[error("Mstari {line}: {type_name} haifanyi operesheni hii")]
    InvalidIndexAssignment { type_name: &'static str, line: u32 },

    /// `++`/`--` on a binding that is not numeric
    #[error("Mstari {line}: {name} sio kitambulishi cha namba au desimali")]
    InvalidPostfixTarget { name: String, line: u32 },

    /// Integer modulo by zero
    #[error("Mstari {line}: Huwezi kugawa kwa sifuri")]
    ZeroModulo { line: u32 },

    /// Argument error reported by a builtin
    #[error("Mstari {line}: {message}")]
    Builtin { message: String, line: u32 },
}

impl RuntimeError {
    /// Source line the error points at, where the message carries one
    pub fn line(&self) -> Option<u32> {
        match self {
            RuntimeError::UnknownPrefixOperator { line, .. }
            | RuntimeError::UnknownInfixOperator { line, .. }
            | RuntimeError::TypeMismatch { line, .. }
            | RuntimeError::UnknownIdentifier { line, .. }
            | RuntimeError::NotAFunction { line, .. }
            | RuntimeError::UnhashableKey { line, .. }
            | RuntimeError::InvalidKey { line, .. }
            | RuntimeError::NotIterable { line, .. }
            | RuntimeError::InvalidArrayIndex { line, .. }
            | RuntimeError::NotIndexable { line, .. }
            | RuntimeError::InvalidAssignmentTarget { line, .. }
            | RuntimeError::InvalidIndexAssignment { line, .. }
            | RuntimeError::InvalidPostfixTarget { line, .. }
            | RuntimeError::ZeroModulo { line }
            | RuntimeError::Builtin { line, .. } => Some(*line),
            RuntimeError::IndexOutOfRange => None,
        }
    }
}

/// Error reported by the parser
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Mstari {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
}
