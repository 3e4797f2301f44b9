//! A small bytecode-compiled scripting language: lexer, Pratt parser,
//! compiler, and stack VM.
//!
//! [`run`] is the one-shot entry point: lex, parse, compile, and execute
//! `source`, returning the final value together with any accumulated
//! errors. [`Session`] is the incremental counterpart a REPL would sit on
//! top of — it keeps the same globals vector, constant pool, and symbol
//! table alive across calls to `eval`, so a name defined in one call
//! resolves in the next.

mod ast;
mod code;
mod compiler;
mod error;
mod lexer;
mod parser;
mod symbol_table;
mod token;
mod value;
mod vm;

pub use compiler::{Bytecode, Compiler};
pub use error::{CompileError, ParseError, RuntimeError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use symbol_table::SymbolTable;
pub use value::{CompiledFunction, HashKey, Value};
pub use vm::{Vm, GLOBALS_SIZE};

/// Lex, parse, compile, and run `source` in a fresh environment.
///
/// Returns the value of the program's final expression (or `Value::Null`
/// if it never produced one) alongside any error messages accumulated at
/// whichever stage the pipeline stopped at. A non-empty error list means
/// later stages did not run: parse errors prevent compilation, and compile
/// errors prevent execution.
pub fn run(source: &[u8]) -> (Value, Vec<String>) {
    let mut session = Session::new();
    session.eval(source)
}

/// An incremental evaluation session: owns a persistent `globals` vector
/// and `SymbolTable` across calls to [`Session::eval`], the shape needed
/// for a REPL where each line should see names defined by earlier ones.
pub struct Session {
    globals: Vec<Value>,
    symbol_table: Option<SymbolTable>,
    constants: Vec<Value>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            globals: vec![Value::Null; GLOBALS_SIZE],
            symbol_table: Some(SymbolTable::new(&vm::BUILTIN_NAMES)),
            constants: Vec::new(),
        }
    }

    /// Lex, parse, compile, and run `source` against this session's
    /// accumulated globals, constants, and symbol table.
    pub fn eval(&mut self, source: &[u8]) -> (Value, Vec<String>) {
        let lexer = Lexer::new(source);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        if !parser.errors.is_empty() {
            return (Value::Null, parser.errors);
        }

        let symbol_table = self
            .symbol_table
            .take()
            .expect("session symbol table is always present between calls");
        let constants = std::mem::take(&mut self.constants);
        let compiler = Compiler::new(symbol_table, constants);

        // The symbol table comes back even on a compile error: names
        // defined before the offending statement stay resolvable on the
        // next `eval` call.
        let (result, symbol_table) = compiler.compile(&program);
        self.symbol_table = Some(symbol_table);

        let bytecode = match result {
            Ok(bytecode) => bytecode,
            Err(err) => return (Value::Null, vec![err.to_string()]),
        };
        self.constants = bytecode.constants.clone();

        let mut vm = Vm::new(&bytecode, &mut self.globals);
        match vm.run() {
            Ok(value) => (value, Vec::new()),
            Err(err) => (Value::Null, vec![err.to_string()]),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_evaluates_the_final_expression() {
        let (value, errors) = run(b"1 + 2 * 3");
        assert!(errors.is_empty());
        assert_eq!(value, Value::Int(7));
    }

    #[test]
    fn run_surfaces_a_runtime_error() {
        let (_, errors) = run(b"5 + true");
        assert_eq!(errors, vec!["type mismatch: INTEGER + BOOLEAN"]);
    }

    #[test]
    fn run_surfaces_a_compile_error() {
        let (_, errors) = run(b"foobar");
        assert_eq!(errors, vec!["undefined variable: foobar"]);
    }

    #[test]
    fn run_surfaces_parse_errors_and_skips_execution() {
        let (value, errors) = run(b"let x 5;");
        assert_eq!(value, Value::Null);
        assert!(!errors.is_empty());
    }

    #[test]
    fn session_persists_globals_across_eval_calls() {
        let mut session = Session::new();
        let (_, errors) = session.eval(b"let a = 5;");
        assert!(errors.is_empty());
        let (value, errors) = session.eval(b"a + 1");
        assert!(errors.is_empty());
        assert_eq!(value, Value::Int(6));
    }

    #[test]
    fn session_persists_functions_across_eval_calls() {
        let mut session = Session::new();
        session.eval(b"let add = fn(a, b) { a + b };");
        let (value, errors) = session.eval(b"add(2, 3)");
        assert!(errors.is_empty());
        assert_eq!(value, Value::Int(5));
    }
}
