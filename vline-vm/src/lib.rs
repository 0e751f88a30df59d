// vline-vm - Bytecode compiler and virtual machine for the VLine programming language
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! # vline-vm
//!
//! The execution core of VLine: the bytecode ISA, the one-pass code
//! generator with back-patched jumps, and the stack-based virtual
//! machine with its frame and call discipline.

pub mod bytecode;
pub mod codegen;
pub mod context;
pub mod vm;

pub use bytecode::{CallOperand, Constant, Op, Program};
pub use codegen::generate;
pub use context::{Context, FunctionRecord, FunctionTable};
pub use vm::{DEFAULT_MAX_DEPTH, Frame, OperandStack, VM};
