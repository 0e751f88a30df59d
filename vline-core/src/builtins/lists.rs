// vline-core - List built-ins
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! `range`, `len`, and the in-place list mutators `append`, `erase`,
//! `insert`. The mutators take the list as their first argument and return
//! the mutated list; the compiler rebinds the receiver with the result.

use vline_parser::{BigNum, Value};

use crate::error::{Error, Result};

use super::{HostIo, check_arg_count};

/// `range(a, b)` - list of the numbers a, a+1, … up to but excluding b.
pub(crate) fn builtin_range(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("range", 2, args)?;
    let (start, end) = match (&args[0], &args[1]) {
        (Value::Num(a), Value::Num(b)) => (a.clone(), b.clone()),
        _ => return Err(Error::type_error("range() expects numbers")),
    };

    let one = BigNum::from(1);
    let mut items = Vec::new();
    let mut current = start;
    while current < end {
        items.push(Value::Num(current.clone()));
        current = &current + &one;
    }
    Ok(Value::list(items))
}

/// `len(x)` - code-point count of a string, element count of a list.
pub(crate) fn builtin_len(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("len", 1, args)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::from(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::from(items.len() as i64)),
        _ => Err(Error::type_error("len() expects string or list")),
    }
}

fn expect_list(name: &str, value: &Value) -> Result<im::Vector<Value>> {
    match value {
        Value::List(items) => Ok(items.clone()),
        other => Err(Error::type_error(format!(
            "{}() expects a list, got {}",
            name,
            other.type_name()
        ))),
    }
}

fn expect_index(name: &str, value: &Value, len: usize, inclusive_end: bool) -> Result<usize> {
    let n = match value {
        Value::Num(n) => n,
        _ => return Err(Error::type_error(format!("{}() expects a number index", name))),
    };
    let bound = BigNum::from(len as i64);
    let in_range = if inclusive_end {
        !n.is_negative() && *n <= bound
    } else {
        !n.is_negative() && *n < bound
    };
    if !in_range {
        return Err(Error::index(format!("{}() index out of range", name)));
    }
    Ok(n.to_i64_saturating() as usize)
}

/// `append(list, value)` - push a value at the end.
pub(crate) fn builtin_append(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("append", 2, args)?;
    let mut items = expect_list("append", &args[0])?;
    items.push_back(args[1].clone());
    Ok(Value::List(items))
}

/// `erase(list, begin, end)` - remove the half-open range [begin, end).
pub(crate) fn builtin_erase(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("erase", 3, args)?;
    let mut items = expect_list("erase", &args[0])?;
    let begin = expect_index("erase", &args[1], items.len(), true)?;
    let end = expect_index("erase", &args[2], items.len(), true)?;
    if begin > end {
        return Err(Error::index("Invalid erase range"));
    }
    for _ in begin..end {
        items.remove(begin);
    }
    Ok(Value::List(items))
}

/// `insert(list, index, value)` - insert before `index`.
pub(crate) fn builtin_insert(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("insert", 3, args)?;
    let mut items = expect_list("insert", &args[0])?;
    let index = expect_index("insert", &args[1], items.len(), true)?;
    items.insert(index, args[2].clone());
    Ok(Value::List(items))
}
