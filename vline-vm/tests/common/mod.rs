// vline-vm - Shared helpers for integration tests
// Copyright (c) 2025 The VLine Authors. MIT licensed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use vline_core::HostIo;
use vline_core::error::{Error, Result};
use vline_parser::{Lexer, Parser, Value};
use vline_vm::{Context, Program, VM, generate};

/// A `Write` sink that keeps a handle on its buffer, so stdout can be
/// inspected after the VM (which owns the sink) has run.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compiles one source unit against a context.
pub fn compile(source: &str, ctx: &mut Context) -> Result<Program> {
    let tokens = Lexer::new(source).tokenize()?;
    let statements = Parser::new(tokens).parse()?;
    generate(&statements, ctx)
}

/// A VM wired to a capturing stdout and an empty stdin.
pub fn capturing_vm() -> (VM, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let io = HostIo::with(Box::new(io::empty()), Box::new(buffer.clone()));
    (VM::with_io(io), buffer)
}

/// Compiles and runs a program, returning the result and captured
/// stdout.
pub fn run_program(source: &str) -> (Result<Value>, String) {
    let mut ctx = Context::default();
    let (mut vm, buffer) = capturing_vm();
    let result = compile(source, &mut ctx)
        .and_then(|program| vm.run(Rc::new(program), ctx.functions.clone()));
    (result, buffer.contents())
}

/// Runs a program that must succeed; returns its stdout.
pub fn run_ok(source: &str) -> String {
    let (result, output) = run_program(source);
    match result {
        Ok(_) => output,
        Err(e) => panic!("program failed: {}\noutput so far: {}", e, output),
    }
}

/// Runs a program that must fail; returns the error.
pub fn run_err(source: &str) -> Error {
    let (result, output) = run_program(source);
    match result {
        Err(e) => e,
        Ok(value) => panic!(
            "program unexpectedly succeeded with {:?}\noutput: {}",
            value, output
        ),
    }
}
