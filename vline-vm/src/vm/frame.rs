// vline-vm - Call frames for the VLine VM
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Execution records: one frame per running program (main or function
//! body).

use std::collections::HashMap;
use std::rc::Rc;

use vline_parser::Value;

use crate::bytecode::Program;

/// A call frame. Frames form a stack inside the VM; `parent` indexes the
/// lexically enclosing frame for variable reads. Writes always land in
/// the executing frame.
#[derive(Debug)]
pub struct Frame {
    /// The program this frame executes; shared, never mutated.
    pub program: Rc<Program>,

    /// Program counter into `program`.
    pub pc: usize,

    /// Local bindings.
    pub locals: HashMap<String, Value>,

    /// Index of the parent frame in the VM's frame stack.
    pub parent: Option<usize>,

    /// Filled by `RETURN`; null when execution falls off the end.
    pub return_value: Value,
}

impl Frame {
    pub fn new(program: Rc<Program>, parent: Option<usize>) -> Self {
        Frame {
            program,
            pc: 0,
            locals: HashMap::new(),
            parent,
            return_value: Value::Null,
        }
    }

    pub fn with_locals(
        program: Rc<Program>,
        locals: HashMap<String, Value>,
        parent: Option<usize>,
    ) -> Self {
        Frame {
            program,
            pc: 0,
            locals,
            parent,
            return_value: Value::Null,
        }
    }
}
