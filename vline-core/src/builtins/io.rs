// vline-core - Console I/O built-ins
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! `print` and `input`.

use std::io::{BufRead, Write};

use vline_parser::Value;

use crate::error::{Error, Result};

use super::HostIo;

/// `print(args…)` - write each argument in display form, then a newline.
pub(crate) fn builtin_print(io: &mut HostIo, args: &[Value]) -> Result<Value> {
    for arg in args {
        write!(io.stdout, "{}", arg).map_err(|e| Error::io(e.to_string()))?;
    }
    writeln!(io.stdout).map_err(|e| Error::io(e.to_string()))?;
    io.stdout.flush().map_err(|e| Error::io(e.to_string()))?;
    Ok(Value::Null)
}

/// `input([prompt])` - optionally print a prompt, then read one line.
pub(crate) fn builtin_input(io: &mut HostIo, args: &[Value]) -> Result<Value> {
    if let Some(prompt) = args.first() {
        write!(io.stdout, "{}", prompt).map_err(|e| Error::io(e.to_string()))?;
        io.stdout.flush().map_err(|e| Error::io(e.to_string()))?;
    }
    let mut line = String::new();
    io.stdin
        .read_line(&mut line)
        .map_err(|e| Error::io(e.to_string()))?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Value::Str(line))
}
