//! # Arithmetic, Comparison, and Unary Operations
//!
//! Implements the stack machine semantics for `ADD`/`SUB`/`MUL`/`DIV`,
//! `EQ`/`NEQ`/`GT`, and the two unary opcodes `MINUS`/`BANG`.
//!
//! Each handler pops its operands off the VM stack (right first, then left
//! for binary ops, matching the compiler's left-then-right emission order),
//! performs the operation, and pushes exactly one [`Value`] result — or
//! returns a [`RuntimeError`] without pushing anything, which the caller
//! turns into an aborting `Value::Error`.

use crate::code::Opcode;
use crate::error::RuntimeError;
use crate::value::Value;

use super::Vm;

pub(super) fn binary_op(vm: &mut Vm, op: Opcode) -> Result<(), RuntimeError> {
    let right = vm.pop();
    let left = vm.pop();
    let result = match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => match op {
            Opcode::Add => Value::Int(l + r),
            Opcode::Sub => Value::Int(l - r),
            Opcode::Mul => Value::Int(l * r),
            Opcode::Div if *r == 0 => return Err(RuntimeError::new("division by zero")),
            Opcode::Div => Value::Int(l / r),
            _ => unreachable!("binary_op called with non-arithmetic opcode"),
        },
        (Value::Str(l), Value::Str(r)) if op == Opcode::Add => {
            Value::str(format!("{l}{r}"))
        }
        _ => {
            return Err(type_error_for(op, &left, &right));
        }
    };
    vm.push(result)
}

fn type_error_for(op: Opcode, left: &Value, right: &Value) -> RuntimeError {
    let symbol = match op {
        Opcode::Add => "+",
        Opcode::Sub => "-",
        Opcode::Mul => "*",
        Opcode::Div => "/",
        _ => unreachable!(),
    };
    if left.type_name() == right.type_name() {
        RuntimeError::unknown_infix_operator(symbol, left.type_name(), right.type_name())
    } else {
        RuntimeError::type_mismatch(symbol, left.type_name(), right.type_name())
    }
}

pub(super) fn comparison_op(vm: &mut Vm, op: Opcode) -> Result<(), RuntimeError> {
    let right = vm.pop();
    let left = vm.pop();
    let result = match op {
        Opcode::Equal => Value::Bool(left.structural_eq(&right)),
        Opcode::NotEqual => Value::Bool(!left.structural_eq(&right)),
        Opcode::GreaterThan => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Value::Bool(l > r),
            _ => {
                return Err(RuntimeError::unknown_infix_operator(
                    ">",
                    left.type_name(),
                    right.type_name(),
                ))
            }
        },
        _ => unreachable!("comparison_op called with non-comparison opcode"),
    };
    vm.push(result)
}

pub(super) fn minus(vm: &mut Vm) -> Result<(), RuntimeError> {
    let operand = vm.pop();
    match operand {
        Value::Int(i) => vm.push(Value::Int(-i)),
        other => Err(RuntimeError::unknown_prefix_operator("-", other.type_name())),
    }
}

pub(super) fn bang(vm: &mut Vm) -> Result<(), RuntimeError> {
    let operand = vm.pop();
    let result = match operand {
        Value::Bool(true) => Value::Bool(false),
        Value::Bool(false) => Value::Bool(true),
        Value::Null => Value::Bool(true),
        _ => Value::Bool(false),
    };
    vm.push(result)
}
