// vline-core - File built-ins
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! `read` and `write`. Files open, transfer, and close inside the call;
//! no handle escapes into a value.

use std::fs;

use vline_parser::Value;

use crate::error::{Error, Result};

use super::{HostIo, check_arg_count};

/// `read(path)` - whole file as a string.
pub(crate) fn builtin_read(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("read", 1, args)?;
    let path = match &args[0] {
        Value::Str(s) => s,
        _ => return Err(Error::type_error("read() expects a string")),
    };
    fs::read_to_string(path)
        .map(Value::Str)
        .map_err(|_| Error::io(format!("Could not open file: {}", path)))
}

/// `write(path, content)` - replace the file's contents.
pub(crate) fn builtin_write(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("write", 2, args)?;
    let (path, content) = match (&args[0], &args[1]) {
        (Value::Str(p), Value::Str(c)) => (p, c),
        _ => return Err(Error::type_error("write() expects two strings")),
    };
    fs::write(path, content).map_err(|_| Error::io(format!("Could not open file: {}", path)))?;
    Ok(Value::Null)
}
