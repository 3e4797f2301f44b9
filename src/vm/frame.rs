//! A single active function invocation.
//!
//! The frame's locals and parameters occupy a contiguous region of the
//! value stack starting at `base_pointer`: parameters fill slots
//! `0..num_parameters`, locals continue on from there. There is no captured
//! environment here — a compiled function is just code plus arity.

use std::rc::Rc;

use crate::value::CompiledFunction;

pub struct Frame {
    pub func: Rc<CompiledFunction>,
    pub ip: usize,
    pub base_pointer: usize,
}

impl Frame {
    pub fn new(func: Rc<CompiledFunction>, base_pointer: usize) -> Self {
        Self {
            func,
            ip: 0,
            base_pointer,
        }
    }

    pub fn instructions(&self) -> &[u8] {
        &self.func.instructions
    }
}
