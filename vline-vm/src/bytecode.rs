// vline-vm - Bytecode instruction definitions for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Bytecode instruction definitions.
//!
//! Instructions operate on a value stack; jump targets are absolute
//! program indices, patched in by the code generator before a program
//! runs. `Label` is a compile-time marker and a no-op at run time.

use std::fmt;

use vline_parser::BigNum;
use vline_parser::ast::BinOp;

/// A literal operand for `LoadConst`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Num(BigNum),
    Str(String),
    Null,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Num(n) => write!(f, "{}", n),
            Constant::Str(s) => write!(f, "\"{}\"", s),
            Constant::Null => write!(f, "null"),
        }
    }
}

/// Operand of a call instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOperand {
    pub name: String,
    pub arg_count: usize,
}

/// Bytecode instructions for the VLine VM.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Push a literal.
    LoadConst(Constant),

    /// Walk the frame chain and push the first binding found.
    LoadVar(String),

    /// Pop and bind the name in the current frame only.
    StoreVar(String),

    /// Pop two operands, apply the operator, push the result.
    BinaryOp(BinOp),

    /// Set pc to the absolute index.
    Jump(usize),

    /// Pop; jump to the absolute index when the value is falsy.
    JumpIfFalse(usize),

    /// Pop `arg_count` arguments and call a free (user or host) function.
    CallFunction(CallOperand),

    /// Pop `arg_count` arguments, a receiver-path string, and a receiver
    /// object; dispatch to the receiver's method and rebind the receiver
    /// afterwards.
    CallMethod(CallOperand),

    /// Move the top of stack (or null) into the frame's return slot and
    /// finish the frame.
    Return,

    /// Pop `count` values and push a list preserving push order.
    BuildList(usize),

    /// Discard the top of stack.
    Pop,

    /// Pop index and list, push the element (bounds-checked).
    LoadSubscript,

    /// Pop value, index, and list; push the mutated list.
    StoreSubscript,

    /// Push a fresh object with no members.
    CreateObject,

    /// Pop an object, push the named member's value.
    LoadMember(String),

    /// Pop object and value, push the object with the member set.
    StoreMember(String),

    /// Push a function handle for the qualified name (an object value
    /// carrying only a method entry).
    LoadFunc(String),

    /// Pop function handle, name string, and object; push the object with
    /// the method bound under the name.
    StoreMemberFunc,

    /// Pop a value and fail with a runtime error carrying its text.
    Raise,

    /// Compile-time marker; no runtime effect.
    Label(usize),
}

/// A compiled program.
pub type Program = Vec<Op>;

impl Op {
    /// True for instructions whose operand is an absolute jump target.
    #[inline]
    pub fn is_jump(&self) -> bool {
        matches!(self, Op::Jump(_) | Op::JumpIfFalse(_))
    }

    /// The jump target, when this is a jump.
    pub fn jump_target(&self) -> Option<usize> {
        match self {
            Op::Jump(target) | Op::JumpIfFalse(target) => Some(*target),
            _ => None,
        }
    }

    /// Rewrites the jump target; back-patching support for the code
    /// generator.
    pub fn patch_target(&mut self, new_target: usize) {
        match self {
            Op::Jump(target) | Op::JumpIfFalse(target) => *target = new_target,
            other => debug_assert!(false, "patch_target called on non-jump: {:?}", other),
        }
    }

    /// The instruction's net stack effect (positive = push). `Return`
    /// reports the usual case of a value being consumed.
    pub fn stack_effect(&self) -> i32 {
        match self {
            Op::LoadConst(_) | Op::LoadVar(_) | Op::CreateObject | Op::LoadFunc(_) => 1,

            Op::StoreVar(_) | Op::JumpIfFalse(_) | Op::Pop | Op::Return | Op::Raise => -1,

            // Pop 2, push 1.
            Op::BinaryOp(_) | Op::LoadSubscript => -1,

            // Pop N, push 1.
            Op::BuildList(count) => 1 - *count as i32,

            // Pop 3, push 1.
            Op::StoreSubscript | Op::StoreMemberFunc => -2,

            // Pop 1, push 1.
            Op::LoadMember(_) => 0,

            // Pop 2, push 1.
            Op::StoreMember(_) => -1,

            Op::CallFunction(call) => 1 - call.arg_count as i32,
            Op::CallMethod(call) => 1 - (call.arg_count as i32 + 2),

            Op::Jump(_) | Op::Label(_) => 0,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::LoadConst(c) => write!(f, "LOAD_CONST {}", c),
            Op::LoadVar(name) => write!(f, "LOAD_VAR {}", name),
            Op::StoreVar(name) => write!(f, "STORE_VAR {}", name),
            Op::BinaryOp(op) => write!(f, "BINARY_OP {}", op),
            Op::Jump(target) => write!(f, "JUMP {}", target),
            Op::JumpIfFalse(target) => write!(f, "JUMP_IF_FALSE {}", target),
            Op::CallFunction(call) => {
                write!(f, "CALL_FUNCTION {} {}", call.name, call.arg_count)
            }
            Op::CallMethod(call) => write!(f, "CALL_METHOD {} {}", call.name, call.arg_count),
            Op::Return => write!(f, "RETURN"),
            Op::BuildList(count) => write!(f, "BUILD_LIST {}", count),
            Op::Pop => write!(f, "POP"),
            Op::LoadSubscript => write!(f, "LOAD_SUBSCRIPT"),
            Op::StoreSubscript => write!(f, "STORE_SUBSCRIPT"),
            Op::CreateObject => write!(f, "CREATE_OBJECT"),
            Op::LoadMember(name) => write!(f, "LOAD_MEMBER {}", name),
            Op::StoreMember(name) => write!(f, "STORE_MEMBER {}", name),
            Op::LoadFunc(name) => write!(f, "LOAD_FUNC {}", name),
            Op::StoreMemberFunc => write!(f, "STORE_MEMBER_FUNC"),
            Op::Raise => write!(f, "RAISE"),
            Op::Label(id) => write!(f, "LABEL {}", id),
        }
    }
}
