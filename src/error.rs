//! # Error Handling
//!
//! This module defines the error types used at each stage of the pipeline:
//! parsing, compiling, and running. Lexical errors have no dedicated type —
//! they surface as `TokenKind::Illegal` tokens, which the parser rejects with
//! its own "no prefix parse function" message.
//!
//! ## Design
//! [`ParseError`], [`CompileError`], and [`RuntimeError`] are all thin
//! `String`-carrying wrappers: the message grammar each stage produces *is*
//! the contract (see the error scenarios a caller can match on), so a richer
//! structured representation would add indirection without adding
//! information. Each implements [`fmt::Display`] and [`std::error::Error`] by
//! hand, matching how this codebase's own runtime error type is written.

use std::fmt;

/// A parse-time error: either "expected next token to be X, got Y instead"
/// or "no prefix parse function for token Z", or an integer literal that
/// failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        ParseError(msg.into())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

/// A compile-time error. Currently only arises from referencing a name the
/// symbol table cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError(pub String);

impl CompileError {
    pub fn undefined_variable(name: &str) -> Self {
        CompileError(format!("undefined variable: {name}"))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CompileError {}

/// A runtime error, raised by pushing a `Value::Error` and aborting the VM
/// loop. Each constructor produces the exact message grammar its situation
/// calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError(pub String);

impl RuntimeError {
    pub fn new(msg: impl Into<String>) -> Self {
        RuntimeError(msg.into())
    }

    pub fn unknown_infix_operator(op: &str, left: &str, right: &str) -> Self {
        RuntimeError(format!("unknown operator: {left} {op} {right}"))
    }

    pub fn unknown_prefix_operator(op: &str, right: &str) -> Self {
        RuntimeError(format!("unknown operator: {op}{right}"))
    }

    pub fn type_mismatch(op: &str, left: &str, right: &str) -> Self {
        RuntimeError(format!("type mismatch: {left} {op} {right}"))
    }

    pub fn unusable_hash_key(kind: &str) -> Self {
        RuntimeError(format!("unusable as hash key: {kind}"))
    }

    pub fn wrong_number_of_arguments(want: usize, got: usize) -> Self {
        RuntimeError(format!("wrong number of arguments: want={want} got={got}"))
    }

    pub fn not_a_function(kind: &str) -> Self {
        RuntimeError(format!("not a function: {kind}"))
    }

    pub fn argument_not_supported(builtin: &str, kind: &str) -> Self {
        RuntimeError(format!(
            "argument to `{builtin}` not supported, got {kind}"
        ))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_grammars_use_the_exact_expected_wording() {
        assert_eq!(
            RuntimeError::type_mismatch("+", "INTEGER", "BOOLEAN").to_string(),
            "type mismatch: INTEGER + BOOLEAN"
        );
        assert_eq!(
            CompileError::undefined_variable("foobar").to_string(),
            "undefined variable: foobar"
        );
        assert_eq!(
            RuntimeError::wrong_number_of_arguments(1, 2).to_string(),
            "wrong number of arguments: want=1 got=2"
        );
    }
}
