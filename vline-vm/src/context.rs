// vline-vm - Compilation context for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! The compilation context threaded through code generation.
//!
//! Holds the three tables a program accumulates while compiling: user
//! functions (including class methods under `Cls.name` keys), classes,
//! and named constants. The VM receives a clone of the function table for
//! each run; records share their compiled programs via `Rc`.

use std::collections::HashMap;
use std::rc::Rc;

use vline_parser::Value;
use vline_parser::ast::{ClassDecl, Expr};

use crate::bytecode::Program;

/// A compiled user function or method.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    /// Table-unique name; `Cls.method` for class methods.
    pub name: String,
    pub params: Vec<String>,
    /// One entry per parameter; `None` when the parameter has no default.
    pub defaults: Vec<Option<Expr>>,
    /// Compiled default-value programs, used when the call site could not
    /// inline them (method calls resolve their callee at run time). Each
    /// ends in `Return`.
    pub default_code: Vec<Option<Rc<Program>>>,
    /// Compiled body.
    pub code: Rc<Program>,
}

/// Owned table of function records, addressed by index. Object method
/// handles are indices into this table.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    records: Vec<FunctionRecord>,
    by_name: HashMap<String, usize>,
}

impl FunctionTable {
    /// Inserts a record, replacing any previous record with the same name
    /// in place so existing handles keep working.
    pub fn insert(&mut self, record: FunctionRecord) -> usize {
        if let Some(&index) = self.by_name.get(&record.name) {
            self.records[index] = record;
            index
        } else {
            let index = self.records.len();
            self.by_name.insert(record.name.clone(), index);
            self.records.push(record);
            index
        }
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, index: usize) -> Option<&FunctionRecord> {
        self.records.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&FunctionRecord> {
        self.lookup(name).and_then(|i| self.get(i))
    }

    pub fn set_code(&mut self, index: usize, code: Rc<Program>) {
        if let Some(record) = self.records.get_mut(index) {
            record.code = code;
        }
    }

    pub fn set_default_code(&mut self, index: usize, default_code: Vec<Option<Rc<Program>>>) {
        if let Some(record) = self.records.get_mut(index) {
            record.default_code = default_code;
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Compilation state shared across a whole session: one context lives as
/// long as the REPL or batch run, so later programs see earlier
/// definitions.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub functions: FunctionTable,
    pub classes: HashMap<String, ClassDecl>,
    pub constants: HashMap<String, Value>,
}
