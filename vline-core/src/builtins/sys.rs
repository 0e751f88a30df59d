// vline-core - System built-ins
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! `system`, `exit`, `sleep`, `time`.

use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use vline_parser::Value;

use crate::error::{Error, Result};

use super::{HostIo, check_arg_count};

/// `system(cmd)` - run a shell command, returning its exit code.
pub(crate) fn builtin_system(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("system", 1, args)?;
    let command = match &args[0] {
        Value::Str(s) => s,
        _ => return Err(Error::type_error("system() expects a string")),
    };
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .map_err(|e| Error::io(e.to_string()))?;
    Ok(Value::from(status.code().unwrap_or(-1) as i64))
}

/// `exit(code)` - terminate the process.
pub(crate) fn builtin_exit(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("exit", 1, args)?;
    let code = match &args[0] {
        Value::Num(n) => n.to_i64_saturating(),
        _ => return Err(Error::type_error("exit() expects a number")),
    };
    std::process::exit(code as i32);
}

/// `sleep(ms)` - block the interpreter for the given milliseconds.
pub(crate) fn builtin_sleep(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("sleep", 1, args)?;
    let millis = match &args[0] {
        Value::Num(n) => n.to_i64_saturating(),
        _ => return Err(Error::type_error("sleep() expects a number")),
    };
    if millis > 0 {
        std::thread::sleep(Duration::from_millis(millis as u64));
    }
    Ok(Value::Null)
}

/// `time()` - seconds since the Unix epoch.
pub(crate) fn builtin_time(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("time", 0, args)?;
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::io(e.to_string()))?
        .as_secs();
    Ok(Value::from(seconds as i64))
}
