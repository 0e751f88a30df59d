// vline-core - Built-in functions for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Host built-in functions.
//!
//! The VM never interprets what a built-in means: it dispatches by name
//! into the registry built here, passing the session's [`HostIo`] and the
//! argument slice. A missing name at run time is the caller's
//! IdentifierError.

mod convert;
mod files;
mod io;
mod lists;
mod math;
mod sys;

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};

use vline_parser::Value;

use crate::error::{Error, Result};

use convert::{builtin_list, builtin_number, builtin_str, builtin_type};
use files::{builtin_read, builtin_write};
use io::{builtin_input, builtin_print};
use lists::{builtin_append, builtin_erase, builtin_insert, builtin_len, builtin_range};
use math::{
    builtin_abs, builtin_ceil, builtin_floor, builtin_pow, builtin_round, builtin_sqrt,
};
use sys::{builtin_exit, builtin_sleep, builtin_system, builtin_time};

/// The host's view of the session: where program input comes from and
/// where program output goes. The CLI swaps these for `--in`/`--out`;
/// tests capture them.
pub struct HostIo {
    pub stdin: Box<dyn BufRead>,
    pub stdout: Box<dyn Write>,
}

impl HostIo {
    /// Process stdin/stdout.
    pub fn new() -> Self {
        HostIo {
            stdin: Box::new(BufReader::new(std::io::stdin())),
            stdout: Box::new(std::io::stdout()),
        }
    }

    pub fn with(stdin: Box<dyn BufRead>, stdout: Box<dyn Write>) -> Self {
        HostIo { stdin, stdout }
    }
}

impl Default for HostIo {
    fn default() -> Self {
        HostIo::new()
    }
}

/// A host-provided callable.
pub type HostFn = fn(&mut HostIo, &[Value]) -> Result<Value>;

/// Builds the registry of built-in functions, keyed by source-level name.
pub fn registry() -> HashMap<&'static str, HostFn> {
    let mut builtins: HashMap<&'static str, HostFn> = HashMap::new();
    builtins.insert("print", builtin_print);
    builtins.insert("input", builtin_input);
    builtins.insert("len", builtin_len);
    builtins.insert("type", builtin_type);
    builtins.insert("range", builtin_range);
    builtins.insert("sleep", builtin_sleep);
    builtins.insert("system", builtin_system);
    builtins.insert("exit", builtin_exit);
    builtins.insert("read", builtin_read);
    builtins.insert("write", builtin_write);
    builtins.insert("time", builtin_time);
    builtins.insert("append", builtin_append);
    builtins.insert("erase", builtin_erase);
    builtins.insert("insert", builtin_insert);
    builtins.insert("floor", builtin_floor);
    builtins.insert("ceil", builtin_ceil);
    builtins.insert("abs", builtin_abs);
    builtins.insert("pow", builtin_pow);
    builtins.insert("round", builtin_round);
    builtins.insert("sqrt", builtin_sqrt);
    builtins.insert("list", builtin_list);
    builtins.insert("str", builtin_str);
    builtins.insert("number", builtin_number);
    builtins
}

/// Fails with a TypeError unless exactly `expected` arguments were passed.
pub(crate) fn check_arg_count(name: &str, expected: usize, args: &[Value]) -> Result<()> {
    if args.len() != expected {
        let plural = if expected == 1 { "argument" } else { "arguments" };
        return Err(Error::type_error(format!(
            "{}() expects {} {}",
            name, expected, plural
        )));
    }
    Ok(())
}
