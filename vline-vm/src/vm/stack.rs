// vline-vm - Operand stack for the VLine VM
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! The expression-evaluation stack, shared by all frames of one VM.

use vline_parser::Value;
use vline_core::error::{Error, Result};

/// The VM's operand stack. Every pop is checked; underflow is a
/// runtime error, never a panic.
#[derive(Debug, Default)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        OperandStack {
            values: Vec::with_capacity(64),
        }
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Value> {
        self.values
            .pop()
            .ok_or_else(|| Error::runtime("Operand stack underflow"))
    }

    /// Pops `n` values, returning them bottom-to-top (source order for
    /// call arguments).
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>> {
        if n > self.values.len() {
            return Err(Error::runtime("Operand stack underflow"));
        }
        let start = self.values.len() - n;
        Ok(self.values.drain(start..).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
