//! # Value Representation for the VM
//!
//! This module defines [`Value`], the universal runtime type used on the
//! virtual machine's operand stack, in the constant pool, and inside arrays
//! and hashes.
//!
//! ## Supported types
//! - `Int(i64)` — 64-bit signed integer
//! - `Bool(bool)` — boolean truth value
//! - `Null` — sentinel for "no value"
//! - `Str(Rc<str>)` — UTF-8 string
//! - `Array(Rc<Vec<Value>>)` — reference-counted array
//! - `Hash(Rc<HashMap<HashKey, Value>>)` — reference-counted map
//! - `CompiledFunction(Rc<CompiledFunction>)` — a compiled function body
//! - `Builtin(u8)` — index into the fixed builtin table
//! - `Error(Rc<str>)` — a runtime error value carried on the stack
//!
//! ## Design
//! `Array` and `Hash` wrap their backing collection in a bare `Rc`, not
//! `Rc<RefCell<_>>`: the instruction set has no opcode that mutates an
//! existing array or hash in place (`push`/`rest` build *new* values), so
//! there is no need for interior mutability — only for cheap, shared
//! storage. `Value::clone()` is therefore always O(1), which matters because
//! it happens on every stack push of a local or global.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A compiled function body: its own instruction stream plus frame-sizing
/// metadata. Holds instructions and arity only — no captured environment,
/// since closures over free variables are out of scope.
#[derive(Debug, PartialEq)]
pub struct CompiledFunction {
    pub instructions: Vec<u8>,
    pub num_locals: u16,
    pub num_parameters: u8,
}

/// A hashable value: legal as a [`Value::Hash`] key. Only `Int`, `Bool`, and
/// `Str` are hashable; everything else fails [`HashKey::try_from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Int(i64),
    Bool(bool),
    Str(Rc<str>),
}

impl HashKey {
    pub fn try_from_value(value: &Value) -> Option<HashKey> {
        match value {
            Value::Int(i) => Some(HashKey::Int(*i)),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::Str(s) => Some(HashKey::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Int(i) => write!(f, "{i}"),
            HashKey::Bool(b) => write!(f, "{b}"),
            HashKey::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Value type for the VM stack, the constant pool, and aggregate elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Null,
    Str(Rc<str>),
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashMap<HashKey, Value>>),
    CompiledFunction(Rc<CompiledFunction>),
    Builtin(u8),
    Error(Rc<str>),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn error(msg: impl Into<Rc<str>>) -> Value {
        Value::Error(msg.into())
    }

    /// Name used in type-mismatch and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Str(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::CompiledFunction(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Error(_) => "ERROR",
        }
    }

    /// Falsy = `Bool(false)` or `Null`; every other value is truthy,
    /// including integer `0`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Null)
    }

    /// Structural equality, used by `EQ`/`NEQ`.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Hash(a), Value::Hash(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|bv| v.structural_eq(bv)))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "null"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(elements) => {
                let parts: Vec<String> = elements.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Hash(map) => {
                let mut parts: Vec<String> =
                    map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                parts.sort();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::CompiledFunction(_) => write!(f, "CompiledFunction"),
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::Error(msg) => write!(f, "ERROR: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(Value::Int(0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::str("").is_truthy());
    }

    #[test]
    fn structural_equality_of_arrays() {
        let a = Value::Array(Rc::new(vec![Value::Int(1), Value::Int(2)]));
        let b = Value::Array(Rc::new(vec![Value::Int(1), Value::Int(2)]));
        let c = Value::Array(Rc::new(vec![Value::Int(1), Value::Int(3)]));
        assert!(a.structural_eq(&b));
        assert!(!a.structural_eq(&c));
    }

    #[test]
    fn hash_key_rejects_non_hashable_values() {
        let arr = Value::Array(Rc::new(vec![]));
        assert!(HashKey::try_from_value(&arr).is_none());
        assert_eq!(
            HashKey::try_from_value(&Value::Int(5)),
            Some(HashKey::Int(5))
        );
    }
}
