// vline-core - Numeric built-ins
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! `floor`, `ceil`, `round`, `abs`, `pow`, `sqrt`.
//!
//! `floor`, `ceil`, and `round` are truncation-based, matching the
//! language's historic behaviour: `floor(-1.5)` is `-1`, and `round`
//! adjusts away from the truncation only when the dropped fraction
//! reaches one half.

use std::str::FromStr;

use vline_parser::{BigNum, Value};

use crate::error::{Error, Result};

use super::{HostIo, check_arg_count};

fn expect_number(name: &str, value: &Value) -> Result<BigNum> {
    match value {
        Value::Num(n) => Ok(n.clone()),
        other => Err(Error::type_error(format!(
            "{}() expects a number, got {}",
            name,
            other.type_name()
        ))),
    }
}

pub(crate) fn builtin_floor(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("floor", 1, args)?;
    let n = expect_number("floor", &args[0])?;
    Ok(Value::Num(n.trunc()))
}

pub(crate) fn builtin_ceil(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("ceil", 1, args)?;
    let n = expect_number("ceil", &args[0])?;
    let truncated = n.trunc();
    if truncated == n {
        Ok(Value::Num(truncated))
    } else {
        Ok(Value::Num(&truncated + &BigNum::from(1)))
    }
}

pub(crate) fn builtin_round(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("round", 1, args)?;
    let n = expect_number("round", &args[0])?;
    let truncated = n.trunc();
    let half = BigNum::from_str("0.5").map_err(|e| Error::runtime(e.message))?;
    if &n - &truncated >= half {
        Ok(Value::Num(&truncated + &BigNum::from(1)))
    } else {
        Ok(Value::Num(truncated))
    }
}

pub(crate) fn builtin_abs(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("abs", 1, args)?;
    let n = expect_number("abs", &args[0])?;
    Ok(Value::Num(n.abs()))
}

pub(crate) fn builtin_pow(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("pow", 2, args)?;
    let base = expect_number("pow", &args[0])?;
    let exponent = expect_number("pow", &args[1])?;
    base.checked_pow(&exponent)
        .map(Value::Num)
        .ok_or_else(|| Error::zero_division("0 cannot be raised to a negative power"))
}

pub(crate) fn builtin_sqrt(_io: &mut HostIo, args: &[Value]) -> Result<Value> {
    check_arg_count("sqrt", 1, args)?;
    let n = expect_number("sqrt", &args[0])?;
    n.sqrt()
        .map(Value::Num)
        .ok_or_else(|| Error::type_error("sqrt() of a negative number"))
}
