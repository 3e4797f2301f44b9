//! # Array and Hash Operations
//!
//! Implements the three VM instructions that build or read compound
//! values: `ARRAY n`, `HASH n`, and `INDEX`.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::value::{HashKey, Value};

use super::Vm;

/// `ARRAY n`: pop `n` values in order and build an array preserving the
/// original source order (the first element popped is the last one, since
/// they were pushed left-to-right).
pub(super) fn build_array(vm: &mut Vm, n: usize) -> Result<(), RuntimeError> {
    let mut elements = Vec::with_capacity(n);
    for _ in 0..n {
        elements.push(vm.pop());
    }
    elements.reverse();
    vm.push(Value::Array(Rc::new(elements)))
}

/// `HASH n`: pop `n` values in `(value, key)` pairs — the compiler emits
/// `key, value` pairs, so each value is popped before its key.
pub(super) fn build_hash(vm: &mut Vm, n: usize) -> Result<(), RuntimeError> {
    let mut pairs = Vec::with_capacity(n / 2);
    for _ in 0..n / 2 {
        let value = vm.pop();
        let key = vm.pop();
        let hash_key = HashKey::try_from_value(&key)
            .ok_or_else(|| RuntimeError::unusable_hash_key(key.type_name()))?;
        pairs.push((hash_key, value));
    }
    pairs.reverse();
    let map: HashMap<HashKey, Value> = pairs.into_iter().collect();
    vm.push(Value::Hash(Rc::new(map)))
}

/// `INDEX`: pop the index, then the target, and push the element it
/// denotes. Out-of-range array access and missing hash keys both yield
/// `Null`; anything else (unhashable key, non-indexable target) aborts.
pub(super) fn index(vm: &mut Vm) -> Result<(), RuntimeError> {
    let idx = vm.pop();
    let target = vm.pop();
    match (&target, &idx) {
        (Value::Array(elements), Value::Int(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                vm.push(Value::Null)
            } else {
                vm.push(elements[*i as usize].clone())
            }
        }
        (Value::Hash(map), key) => {
            let hash_key = HashKey::try_from_value(key)
                .ok_or_else(|| RuntimeError::unusable_hash_key(key.type_name()))?;
            vm.push(map.get(&hash_key).cloned().unwrap_or(Value::Null))
        }
        _ => Err(RuntimeError::new(format!(
            "index operator not supported: {}",
            target.type_name()
        ))),
    }
}
