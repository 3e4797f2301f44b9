use super::*;
use crate::compiler::Compiler;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::symbol_table::SymbolTable;

fn run(input: &str) -> Value {
    let lexer = Lexer::new(input.as_bytes());
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    assert!(parser.errors.is_empty(), "parser errors: {:?}", parser.errors);

    let symbol_table = SymbolTable::new(&BUILTIN_NAMES);
    let compiler = Compiler::new(symbol_table, Vec::new());
    let (result, _) = compiler.compile(&program);
    let bytecode = result.expect("compile error");

    let mut globals = vec![Value::Null; GLOBALS_SIZE];
    let mut vm = Vm::new(&bytecode, &mut globals);
    vm.run().expect("runtime error")
}

fn run_err(input: &str) -> RuntimeError {
    let lexer = Lexer::new(input.as_bytes());
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    assert!(parser.errors.is_empty(), "parser errors: {:?}", parser.errors);

    let symbol_table = SymbolTable::new(&BUILTIN_NAMES);
    let compiler = Compiler::new(symbol_table, Vec::new());
    let (result, _) = compiler.compile(&program);
    let bytecode = result.expect("compile error");

    let mut globals = vec![Value::Null; GLOBALS_SIZE];
    let mut vm = Vm::new(&bytecode, &mut globals);
    vm.run().expect_err("expected a runtime error")
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(run("1 + 2 * 3"), Value::Int(7));
}

#[test]
fn globals_and_arithmetic() {
    assert_eq!(run("let a = 5; let b = a * 2; b + 1"), Value::Int(11));
}

#[test]
fn nested_if_with_early_return_at_top_level() {
    assert_eq!(
        run("if (10 > 1) { if (10 > 1) { 10 } else { 1 } } else { 0 }"),
        Value::Int(10)
    );
}

#[test]
fn function_calls_and_recursion_through_arguments() {
    assert_eq!(
        run("let add = fn(a, b) { a + b }; add(2, add(3, 4))"),
        Value::Int(9)
    );
}

#[test]
fn let_bound_function_can_call_itself_by_name() {
    assert_eq!(
        run("let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } }; fib(6)"),
        Value::Int(8)
    );
}

#[test]
fn array_index_and_len_builtin() {
    assert_eq!(run("let a = [1, 2, 3]; a[1] + len(a)"), Value::Int(5));
}

#[test]
fn hash_index() {
    assert_eq!(run(r#"let h = {"one": 1, "two": 2}; h["two"]"#), Value::Int(2));
}

#[test]
fn double_bang_on_truthy_int() {
    assert_eq!(run("!!5"), Value::Bool(true));
}

#[test]
fn calling_an_empty_function_yields_null() {
    assert_eq!(run("fn(){}()"), Value::Null);
}

#[test]
fn negative_array_index_yields_null() {
    assert_eq!(run("let a = [1, 2, 3]; a[-1]"), Value::Null);
}

#[test]
fn missing_hash_key_yields_null() {
    assert_eq!(run(r#"{"a": 1}["b"]"#), Value::Null);
}

#[test]
fn type_mismatch_aborts_with_runtime_error() {
    assert_eq!(run_err("5 + true").to_string(), "type mismatch: INTEGER + BOOLEAN");
}

#[test]
fn unsupported_operator_on_matching_types_is_unknown_operator_not_type_mismatch() {
    assert_eq!(run_err("true + false").to_string(), "unknown operator: BOOLEAN + BOOLEAN");
}

#[test]
fn wrong_argument_count_is_a_runtime_error() {
    assert_eq!(
        run_err("fn(x){x}(1, 2)").to_string(),
        "wrong number of arguments: want=1 got=2"
    );
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert_eq!(run_err("1 / 0").to_string(), "division by zero");
}
