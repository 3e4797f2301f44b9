//! # Bytecode Compiler
//!
//! Lowers an [`ast::Program`] into a [`Bytecode`]: a flat big-endian
//! instruction stream plus the constant pool it indexes into. Identifier
//! resolution is delegated to a [`SymbolTable`]; everything else is a
//! single recursive walk over the AST.
//!
//! ## Scopes
//! Compiling a function literal needs its own, detached instruction buffer
//! (the compiled function owns its bytecode independently of the caller's).
//! [`CompilationScope`] gives each nesting level its own buffer and its own
//! "last two emitted instructions" bookkeeping, used by the one peephole
//! rule this compiler applies: a trailing `POP` after an expression
//! statement is removed (or rewritten to `RETURNVALUE`) when the expression
//! turns out to be the tail of an `if` branch or function body.

use std::rc::Rc;

use crate::ast::{Expr, Program, Stmt};
use crate::code::{self, Opcode};
use crate::error::CompileError;
use crate::symbol_table::{SymbolScope, SymbolTable};
use crate::value::{CompiledFunction, Value};

/// The compiled artifact: a flat instruction stream and the constants it
/// references by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Bytecode {
    pub instructions: Vec<u8>,
    pub constants: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

struct CompilationScope {
    instructions: Vec<u8>,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

impl CompilationScope {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            last_instruction: None,
            previous_instruction: None,
        }
    }
}

pub struct Compiler {
    constants: Vec<Value>,
    symbol_table: SymbolTable,
    scopes: Vec<CompilationScope>,
}

impl Compiler {
    /// Build a compiler that appends to an existing constant pool and
    /// resolves names through an existing symbol table — the shape needed
    /// to compile each new line of a REPL session against everything
    /// defined so far.
    pub fn new(symbol_table: SymbolTable, constants: Vec<Value>) -> Self {
        Self {
            constants,
            symbol_table,
            scopes: vec![CompilationScope::new()],
        }
    }

    /// Compile `program`, consuming the compiler and handing back the
    /// resulting bytecode together with the symbol table (now populated
    /// with any names the program defined, for reuse by a later call).
    ///
    /// The symbol table is returned even on error: a name resolution
    /// failure partway through a program still leaves earlier `let`
    /// bindings validly defined, and a caller compiling one line at a time
    /// (a REPL session) needs those to survive into the next call.
    pub fn compile(mut self, program: &Program) -> (Result<Bytecode, CompileError>, SymbolTable) {
        let mut first_error = None;
        for stmt in &program.statements {
            if let Err(err) = self.compile_statement(stmt) {
                first_error = Some(err);
                break;
            }
        }
        let instructions = self
            .scopes
            .pop()
            .expect("compiler always has at least one scope")
            .instructions;
        let result = match first_error {
            Some(err) => Err(err),
            None => Ok(Bytecode {
                instructions,
                constants: self.constants,
            }),
        };
        (result, self.symbol_table)
    }

    // ---- scope management -------------------------------------------------

    fn current_instructions(&self) -> &Vec<u8> {
        &self.scopes.last().expect("no active scope").instructions
    }

    fn current_instructions_mut(&mut self) -> &mut Vec<u8> {
        &mut self.scopes.last_mut().expect("no active scope").instructions
    }

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::new());
        self.symbol_table.push_scope();
    }

    fn leave_scope(&mut self) -> (Vec<u8>, u16) {
        let num_locals = self.symbol_table.pop_scope();
        let scope = self.scopes.pop().expect("leave_scope with no scope");
        (scope.instructions, num_locals)
    }

    // ---- emission -----------------------------------------------------

    fn emit(&mut self, op: Opcode, operands: &[u16]) -> usize {
        let scope = self.scopes.last_mut().expect("no active scope");
        let position = code::emit(&mut scope.instructions, op, operands);
        scope.previous_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode: op, position });
        position
    }

    fn add_constant(&mut self, value: Value) -> u16 {
        self.constants.push(value);
        (self.constants.len() - 1) as u16
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        self.scopes
            .last()
            .and_then(|s| s.last_instruction)
            .is_some_and(|last| last.opcode == op)
    }

    /// Truncate the trailing `POP` emitted for an expression statement that
    /// turned out to need its value kept (an `if`/function tail position).
    fn remove_last_pop(&mut self) {
        let scope = self.scopes.last_mut().expect("no active scope");
        let last = scope.last_instruction.expect("remove_last_pop with none");
        scope.instructions.truncate(last.position);
        scope.last_instruction = scope.previous_instruction;
    }

    /// `POP` and `RETURNVALUE` are both single opcode bytes with no
    /// operands, so swapping one for the other is an in-place byte write.
    fn replace_last_pop_with_return(&mut self) {
        let scope = self.scopes.last_mut().expect("no active scope");
        let last = scope.last_instruction.expect("replace with no last instruction");
        scope.instructions[last.position] = Opcode::ReturnValue as u8;
        scope.last_instruction = Some(EmittedInstruction {
            opcode: Opcode::ReturnValue,
            position: last.position,
        });
    }

    fn change_operand(&mut self, pos: usize, operand: u16) {
        code::patch_u16_operand(self.current_instructions_mut(), pos, operand);
    }

    // ---- statements -----------------------------------------------------

    fn compile_statement(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let { name, value } => {
                let symbol = self.symbol_table.define(&name.name);
                self.compile_expression(value)?;
                match symbol.scope {
                    SymbolScope::Global => {
                        self.emit(Opcode::SetGlobal, &[symbol.index]);
                    }
                    SymbolScope::Local => {
                        self.emit(Opcode::SetLocal, &[symbol.index]);
                    }
                    SymbolScope::Builtin => unreachable!("let cannot define a builtin name"),
                }
                Ok(())
            }
            Stmt::Return { value } => {
                match value {
                    Some(expr) => self.compile_expression(expr)?,
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                }
                self.emit(Opcode::ReturnValue, &[]);
                Ok(())
            }
            Stmt::ExprStmt { expr } => {
                self.compile_expression(expr)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Stmt::Block { statements } => {
                for stmt in statements {
                    self.compile_statement(stmt)?;
                }
                Ok(())
            }
        }
    }

    // ---- expressions ----------------------------------------------------

    fn compile_expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::IntLit(v) => {
                let idx = self.add_constant(Value::Int(*v));
                self.emit(Opcode::Const, &[idx]);
                Ok(())
            }
            Expr::BoolLit(true) => {
                self.emit(Opcode::True, &[]);
                Ok(())
            }
            Expr::BoolLit(false) => {
                self.emit(Opcode::False, &[]);
                Ok(())
            }
            Expr::StringLit(s) => {
                let idx = self.add_constant(Value::str(s.as_str()));
                self.emit(Opcode::Const, &[idx]);
                Ok(())
            }
            Expr::ArrayLit(elements) => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit(Opcode::Array, &[elements.len() as u16]);
                Ok(())
            }
            Expr::HashLit(pairs) => {
                let mut sorted: Vec<&(Expr, Expr)> = pairs.iter().collect();
                sorted.sort_by_key(|(key, _)| key.to_string());
                for (key, value) in &sorted {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::Hash, &[(pairs.len() * 2) as u16]);
                Ok(())
            }
            Expr::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "-" => self.emit(Opcode::Minus, &[]),
                    "!" => self.emit(Opcode::Bang, &[]),
                    other => unreachable!("parser never produces prefix operator {other:?}"),
                };
                Ok(())
            }
            Expr::Infix {
                operator,
                left,
                right,
            } if operator == "<" => {
                self.compile_expression(right)?;
                self.compile_expression(left)?;
                self.emit(Opcode::GreaterThan, &[]);
                Ok(())
            }
            Expr::Infix {
                operator,
                left,
                right,
            } => {
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                match operator.as_str() {
                    "+" => self.emit(Opcode::Add, &[]),
                    "-" => self.emit(Opcode::Sub, &[]),
                    "*" => self.emit(Opcode::Mul, &[]),
                    "/" => self.emit(Opcode::Div, &[]),
                    "==" => self.emit(Opcode::Equal, &[]),
                    "!=" => self.emit(Opcode::NotEqual, &[]),
                    ">" => self.emit(Opcode::GreaterThan, &[]),
                    other => unreachable!("parser never produces infix operator {other:?}"),
                };
                Ok(())
            }
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                self.compile_expression(condition)?;
                let jump_if_false_pos = self.emit(Opcode::JumpIfFalse, &[0xFFFF]);

                self.compile_statement(consequence)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }

                let jump_pos = self.emit(Opcode::Jump, &[0xFFFF]);
                let after_consequence = self.current_instructions().len() as u16;
                self.change_operand(jump_if_false_pos, after_consequence);

                match alternative {
                    Some(alt) => {
                        self.compile_statement(alt)?;
                        if self.last_instruction_is(Opcode::Pop) {
                            self.remove_last_pop();
                        }
                    }
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                }

                let after_alternative = self.current_instructions().len() as u16;
                self.change_operand(jump_pos, after_alternative);
                Ok(())
            }
            Expr::FunctionLit { params, body } => {
                self.enter_scope();
                for param in params {
                    self.symbol_table.define(&param.name);
                }

                self.compile_statement(body)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.replace_last_pop_with_return();
                }
                if !self.last_instruction_is(Opcode::ReturnValue) {
                    self.emit(Opcode::Null, &[]);
                    self.emit(Opcode::ReturnValue, &[]);
                }

                let (instructions, num_locals) = self.leave_scope();
                let compiled = Value::CompiledFunction(Rc::new(CompiledFunction {
                    instructions,
                    num_locals,
                    num_parameters: params.len() as u8,
                }));
                let idx = self.add_constant(compiled);
                self.emit(Opcode::Const, &[idx]);
                Ok(())
            }
            Expr::Call { function, args } => {
                self.compile_expression(function)?;
                for arg in args {
                    self.compile_expression(arg)?;
                }
                self.emit(Opcode::Call, &[args.len() as u16]);
                Ok(())
            }
            Expr::Index { left, index } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(Opcode::Index, &[]);
                Ok(())
            }
            Expr::Ident(name) => {
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| CompileError::undefined_variable(name))?;
                match symbol.scope {
                    SymbolScope::Global => self.emit(Opcode::GetGlobal, &[symbol.index]),
                    SymbolScope::Local => self.emit(Opcode::GetLocal, &[symbol.index]),
                    SymbolScope::Builtin => self.emit(Opcode::GetBuiltin, &[symbol.index]),
                };
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile(input: &str) -> Bytecode {
        let lexer = Lexer::new(input.as_bytes());
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors.is_empty(), "parser errors: {:?}", parser.errors);
        let symbol_table = SymbolTable::new(&crate::vm::BUILTIN_NAMES);
        let compiler = Compiler::new(symbol_table, Vec::new());
        let (result, _) = compiler.compile(&program);
        result.expect("compile error")
    }

    #[test]
    fn integer_arithmetic_emits_const_and_op() {
        let bc = compile("1 + 2");
        assert_eq!(
            bc.instructions,
            vec![
                Opcode::Const as u8, 0, 0,
                Opcode::Const as u8, 0, 1,
                Opcode::Add as u8,
                Opcode::Pop as u8,
            ]
        );
        assert_eq!(bc.constants, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn less_than_is_compiled_as_swapped_greater_than() {
        let bc = compile("1 < 2");
        assert_eq!(
            bc.instructions,
            vec![
                Opcode::Const as u8, 0, 0,
                Opcode::Const as u8, 0, 1,
                Opcode::GreaterThan as u8,
                Opcode::Pop as u8,
            ]
        );
        // constants are still emitted in source order: 1 then 2.
        assert_eq!(bc.constants, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn if_without_else_has_no_dangling_placeholder_operand() {
        let bc = compile("if (true) { 10 }; 3333;");
        assert!(!bc.instructions.windows(2).any(|w| w == [0xFF, 0xFF]));
    }

    #[test]
    fn function_literal_with_implicit_return_uses_returnvalue() {
        let bc = compile("fn() { 5 + 10 }");
        let Value::CompiledFunction(f) = &bc.constants[2] else {
            panic!("expected a compiled function constant");
        };
        assert_eq!(
            f.instructions,
            vec![
                Opcode::Const as u8, 0, 0,
                Opcode::Const as u8, 0, 1,
                Opcode::Add as u8,
                Opcode::ReturnValue as u8,
            ]
        );
    }

    #[test]
    fn hash_literal_keys_are_sorted_by_display_before_emission() {
        let bc = compile(r#"{"b": 2, "a": 1}"#);
        // constants should be added in sorted order: "a", 1, "b", 2.
        assert_eq!(
            bc.constants,
            vec![Value::str("a"), Value::Int(1), Value::str("b"), Value::Int(2)]
        );
    }

    #[test]
    fn undefined_identifier_is_a_compile_error() {
        let lexer = Lexer::new(b"foobar");
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        let symbol_table = SymbolTable::new(&crate::vm::BUILTIN_NAMES);
        let compiler = Compiler::new(symbol_table, Vec::new());
        let (result, _) = compiler.compile(&program);
        assert_eq!(result.unwrap_err().to_string(), "undefined variable: foobar");
    }

    #[test]
    fn let_bound_name_is_visible_to_its_own_function_body() {
        // `fib` must resolve inside its own body for recursion to compile at
        // all; this requires `define` to run before the value is compiled.
        let bc = compile(
            "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } };",
        );
        assert!(bc.instructions.contains(&(Opcode::SetGlobal as u8)));
    }
}
