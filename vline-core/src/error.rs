// vline-core - Error types for the VLine runtime
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Error taxonomy shared by the compiler, the virtual machine, and the
//! built-in library.
//!
//! Every error renders as a single human-readable line prefixed with its
//! category, e.g. `Zero Division Error: Division by zero`. The first error
//! aborts the running program; frames unwind and the driver surfaces the
//! message (the REPL prints it, the batch driver exits non-zero).

use std::fmt;

use vline_parser::{LexError, ParseError};

/// Result type for compilation and execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while compiling or running a VLine program.
#[derive(Debug, Clone)]
pub enum Error {
    /// Compile-time-detectable violation: redefined constant,
    /// break/continue outside a loop, missing class parent, bad import,
    /// missing required argument.
    Syntax(String),
    /// Name not found: variable, function, or object member.
    Identifier(String),
    /// Operation on the wrong value shape.
    Type(String),
    /// List index out of bounds or invalid erase range.
    Index(String),
    /// File open/read/write failure.
    Io(String),
    /// Division or modulo by zero.
    ZeroDivision(String),
    /// Frame stack exceeded the host-configured limit.
    Recursion(String),
    /// Operand-stack underflow, unknown opcode, unresolved label, `raise`.
    Runtime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(msg) => write!(f, "Syntax Error: {}", msg),
            Error::Identifier(msg) => write!(f, "Identifier Error: {}", msg),
            Error::Type(msg) => write!(f, "Type Error: {}", msg),
            Error::Index(msg) => write!(f, "Index Error: {}", msg),
            Error::Io(msg) => write!(f, "IO Error: {}", msg),
            Error::ZeroDivision(msg) => write!(f, "Zero Division Error: {}", msg),
            Error::Recursion(msg) => write!(f, "Recursion Error: {}", msg),
            Error::Runtime(msg) => write!(f, "Runtime Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Error::Syntax(msg.into())
    }

    pub fn identifier(msg: impl Into<String>) -> Self {
        Error::Identifier(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Error::Index(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    pub fn zero_division(msg: impl Into<String>) -> Self {
        Error::ZeroDivision(msg.into())
    }

    pub fn recursion(msg: impl Into<String>) -> Self {
        Error::Recursion(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::Runtime(msg.into())
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Syntax(e.to_string())
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Syntax(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_category_prefixes() {
        assert_eq!(
            Error::zero_division("Division by zero").to_string(),
            "Zero Division Error: Division by zero"
        );
        assert_eq!(
            Error::identifier("Undefined variable 'x'").to_string(),
            "Identifier Error: Undefined variable 'x'"
        );
        assert_eq!(
            Error::syntax("'break' outside loop").to_string(),
            "Syntax Error: 'break' outside loop"
        );
    }
}
