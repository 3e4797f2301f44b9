//! # Built-in Function Dispatch
//!
//! The runtime's small standard library: `len`, `first`, `last`, `rest`,
//! `push`, `puts`. Each is a pure function from arguments to a `Value` or
//! an `Err`, with no VM coupling — the VM only supplies the popped argument
//! slice.
//!
//! [`BUILTINS`] is the single source of truth for both directions builtins
//! are addressed from: [`BUILTIN_NAMES`] feeds the symbol table (name →
//! index, consulted before compilation) and the array itself is indexed
//! directly at call time by the operand `GETBUILTIN`/`CALL` compiled in.

use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::error::RuntimeError;
use crate::value::Value;

pub type BuiltinFn = fn(&[Value]) -> Result<Value, RuntimeError>;

pub static BUILTINS: Lazy<[(&str, BuiltinFn); 6]> = Lazy::new(|| {
    [
        ("len", len),
        ("first", first),
        ("last", last),
        ("rest", rest),
        ("push", push),
        ("puts", puts),
    ]
});

/// Just the names, in the same order as [`BUILTINS`], for seeding the
/// symbol table's builtin scope before compilation.
pub static BUILTIN_NAMES: Lazy<Vec<&'static str>> =
    Lazy::new(|| BUILTINS.iter().map(|(name, _)| *name).collect());

pub fn call(index: u8, args: &[Value]) -> Result<Value, RuntimeError> {
    let (_, func) = BUILTINS[index as usize];
    func(args)
}

fn len(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [Value::Str(s)] => Ok(Value::Int(s.len() as i64)),
        [Value::Array(elements)] => Ok(Value::Int(elements.len() as i64)),
        [other] => Err(RuntimeError::argument_not_supported("len", other.type_name())),
        _ => Err(RuntimeError::wrong_number_of_arguments(1, args.len())),
    }
}

fn first(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [Value::Array(elements)] => Ok(elements.first().cloned().unwrap_or(Value::Null)),
        [other] => Err(RuntimeError::argument_not_supported("first", other.type_name())),
        _ => Err(RuntimeError::wrong_number_of_arguments(1, args.len())),
    }
}

fn last(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [Value::Array(elements)] => Ok(elements.last().cloned().unwrap_or(Value::Null)),
        [other] => Err(RuntimeError::argument_not_supported("last", other.type_name())),
        _ => Err(RuntimeError::wrong_number_of_arguments(1, args.len())),
    }
}

fn rest(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [Value::Array(elements)] => {
            if elements.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Array(Rc::new(elements[1..].to_vec())))
            }
        }
        [other] => Err(RuntimeError::argument_not_supported("rest", other.type_name())),
        _ => Err(RuntimeError::wrong_number_of_arguments(1, args.len())),
    }
}

fn push(args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [Value::Array(elements), item] => {
            let mut copy = elements.as_ref().clone();
            copy.push(item.clone());
            Ok(Value::Array(Rc::new(copy)))
        }
        [other, _] => Err(RuntimeError::argument_not_supported("push", other.type_name())),
        _ => Err(RuntimeError::wrong_number_of_arguments(2, args.len())),
    }
}

fn puts(args: &[Value]) -> Result<Value, RuntimeError> {
    for arg in args {
        println!("{arg}");
    }
    Ok(Value::Null)
}
