// vline-core - Type inspection and conversion built-ins
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! `type`, `str`, `number`, `list`.

use std::str::FromStr;

use vline_parser::{BigNum, Value};

use crate::error::{Error, Result};

use super::{HostIo, check_arg_count};

/// `type(x)` - the value's type name as a string.
pub(crate) fn builtin_type(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("type", 1, args)?;
    Ok(Value::string(args[0].type_name()))
}

/// `number(x)` - numbers pass through, strings parse, null is zero.
pub(crate) fn builtin_number(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("number", 1, args)?;
    match &args[0] {
        Value::Num(n) => Ok(Value::Num(n.clone())),
        Value::Str(s) => BigNum::from_str(s)
            .map(Value::Num)
            .map_err(|e| Error::type_error(e.message)),
        Value::Null => Ok(Value::Num(BigNum::new())),
        _ => Err(Error::type_error("Cannot convert to number")),
    }
}

/// `str(x)` - numbers, strings, and null convert; anything else fails.
pub(crate) fn builtin_str(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("str", 1, args)?;
    match &args[0] {
        Value::Num(n) => Ok(Value::string(n.to_string())),
        Value::Str(s) => Ok(Value::string(s.clone())),
        Value::Null => Ok(Value::string("null")),
        _ => Err(Error::type_error("Cannot convert to string")),
    }
}

/// `list(x)` - lists pass through, strings split into one-character
/// strings, null is the empty list, a number becomes a singleton.
pub(crate) fn builtin_list(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("list", 1, args)?;
    match &args[0] {
        Value::List(items) => Ok(Value::List(items.clone())),
        Value::Str(s) => Ok(Value::list(
            s.chars().map(|c| Value::string(c.to_string())).collect(),
        )),
        Value::Null => Ok(Value::list(Vec::new())),
        Value::Num(n) => Ok(Value::list(vec![Value::Num(n.clone())])),
        _ => Err(Error::type_error("Cannot convert to list")),
    }
}
