// vline-vm - Binary operator evaluation for the VLine VM
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Value-level semantics of `BINARY_OP` and the subscript instructions.
//!
//! Equality is same-tag structural; a cross-type `==` is false and `!=`
//! true. Ordering is defined only for number/number and string/string
//! pairs. `and`/`or` evaluate both operands and apply the shared
//! truthiness rule.

use vline_parser::{BigNum, Value, Vector};
use vline_parser::ast::BinOp;
use vline_core::error::{Error, Result};

/// Applies a binary operator to two popped operands.
pub fn binary_op(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Num(a), Value::Num(b)) => Ok(Value::Num(&a + &b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (l, r) => Err(Error::type_error(format!(
                "Cannot add {} and {}",
                l.type_name(),
                r.type_name()
            ))),
        },

        BinOp::Sub => {
            let (a, b) = expect_numbers(op, left, right)?;
            Ok(Value::Num(&a - &b))
        }

        BinOp::Mul => multiply(left, right),

        BinOp::Div => {
            let (a, b) = expect_numbers(op, left, right)?;
            a.checked_div(&b)
                .map(Value::Num)
                .ok_or_else(|| Error::zero_division("Division by zero"))
        }

        BinOp::Mod => {
            let (a, b) = expect_numbers(op, left, right)?;
            a.checked_rem(&b)
                .map(Value::Num)
                .ok_or_else(|| Error::zero_division("Modulo by zero"))
        }

        BinOp::Pow => {
            let (a, b) = expect_numbers(op, left, right)?;
            a.checked_pow(&b)
                .map(Value::Num)
                .ok_or_else(|| Error::zero_division("0 cannot be raised to a negative power"))
        }

        BinOp::BitOr => {
            let (a, b) = expect_numbers(op, left, right)?;
            Ok(Value::from(a.to_i64_saturating() | b.to_i64_saturating()))
        }

        BinOp::BitAnd => {
            let (a, b) = expect_numbers(op, left, right)?;
            Ok(Value::from(a.to_i64_saturating() & b.to_i64_saturating()))
        }

        // Unary at the source level; the left operand is a dummy zero.
        BinOp::BitNot => {
            let (_, b) = expect_numbers(op, left, right)?;
            Ok(Value::from(!b.to_i64_saturating()))
        }

        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(op, left, right),

        BinOp::Eq => Ok(Value::from(left == right)),
        BinOp::Ne => Ok(Value::from(left != right)),

        BinOp::And => Ok(Value::from(left.truthy() && right.truthy())),
        BinOp::Or => Ok(Value::from(left.truthy() || right.truthy())),

        // Normally lowered to LOAD_SUBSCRIPT; kept equivalent here.
        BinOp::Index => subscript(&left, &right),
    }
}

fn expect_numbers(op: BinOp, left: Value, right: Value) -> Result<(BigNum, BigNum)> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => Ok((a, b)),
        _ => Err(Error::type_error(format!(
            "Operator {} requires numbers",
            op
        ))),
    }
}

fn multiply(left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => Ok(Value::Num(&a * &b)),
        (Value::Str(s), Value::Num(n)) | (Value::Num(n), Value::Str(s)) => {
            let times = n.to_i64_saturating();
            if times < 0 {
                return Err(Error::type_error(
                    "Cannot multiply string by negative number",
                ));
            }
            Ok(Value::Str(s.repeat(times as usize)))
        }
        (Value::List(items), Value::Num(n)) | (Value::Num(n), Value::List(items)) => {
            let times = n.to_i64_saturating();
            if times < 0 {
                return Err(Error::type_error(
                    "Cannot multiply list by negative number",
                ));
            }
            let mut result = Vector::new();
            for _ in 0..times {
                result.append(items.clone());
            }
            Ok(Value::List(result))
        }
        _ => Err(Error::type_error("Invalid operand types for multiplication")),
    }
}

fn compare(op: BinOp, left: Value, right: Value) -> Result<Value> {
    let ordering = match (&left, &right) {
        (Value::Num(a), Value::Num(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        _ => {
            return Err(Error::type_error(
                "Comparison requires two numbers or two strings",
            ));
        }
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Value::from(result))
}

/// Bounds-checks a subscript index against a list length.
pub fn list_index(index: &Value, len: usize) -> Result<usize> {
    let n = match index {
        Value::Num(n) => n,
        _ => return Err(Error::type_error("Index must be a number")),
    };
    if n.is_negative() || *n >= BigNum::from(len as i64) {
        return Err(Error::index("Index out of range"));
    }
    Ok(n.to_i64_saturating() as usize)
}

/// `list[index]`.
pub fn subscript(list: &Value, index: &Value) -> Result<Value> {
    let items = match list {
        Value::List(items) => items,
        other => {
            return Err(Error::type_error(format!(
                "Expected list, got {}",
                other.type_name()
            )));
        }
    };
    let i = list_index(index, items.len())?;
    Ok(items[i].clone())
}

/// `list[index] = value`, returning the mutated list.
pub fn store_subscript(list: Value, index: &Value, value: Value) -> Result<Value> {
    let mut items = match list {
        Value::List(items) => items,
        other => {
            return Err(Error::type_error(format!(
                "Expected list, got {}",
                other.type_name()
            )));
        }
    };
    let i = list_index(index, items.len())?;
    items.set(i, value);
    Ok(Value::List(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: i64) -> Value {
        Value::from(v)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(binary_op(BinOp::Add, n(2), n(3)).unwrap(), n(5));
        assert_eq!(binary_op(BinOp::Sub, n(2), n(3)).unwrap(), n(-1));
        assert_eq!(binary_op(BinOp::Mul, n(4), n(3)).unwrap(), n(12));
        assert_eq!(binary_op(BinOp::Pow, n(2), n(10)).unwrap(), n(1024));
    }

    #[test]
    fn string_concat_and_repeat() {
        assert_eq!(
            binary_op(BinOp::Add, Value::string("ab"), Value::string("cd")).unwrap(),
            Value::string("abcd")
        );
        assert_eq!(
            binary_op(BinOp::Mul, Value::string("ab"), n(3)).unwrap(),
            Value::string("ababab")
        );
    }

    #[test]
    fn division_by_zero_fails() {
        assert!(matches!(
            binary_op(BinOp::Div, n(1), n(0)),
            Err(Error::ZeroDivision(_))
        ));
        assert!(matches!(
            binary_op(BinOp::Mod, n(1), n(0)),
            Err(Error::ZeroDivision(_))
        ));
    }

    #[test]
    fn cross_type_equality() {
        assert_eq!(binary_op(BinOp::Eq, n(1), Value::string("1")).unwrap(), n(0));
        assert_eq!(binary_op(BinOp::Ne, n(1), Value::string("1")).unwrap(), n(1));
        assert!(binary_op(BinOp::Lt, n(1), Value::string("1")).is_err());
    }

    #[test]
    fn logic_uses_truthiness() {
        assert_eq!(binary_op(BinOp::And, n(2), n(3)).unwrap(), n(1));
        assert_eq!(binary_op(BinOp::And, n(2), Value::Null).unwrap(), n(0));
        assert_eq!(
            binary_op(BinOp::Or, Value::string(""), n(0)).unwrap(),
            n(0)
        );
        assert_eq!(
            binary_op(BinOp::Or, Value::string("x"), n(0)).unwrap(),
            n(1)
        );
    }

    #[test]
    fn subscript_bounds() {
        let list = Value::list(vec![n(10), n(20)]);
        assert_eq!(subscript(&list, &n(1)).unwrap(), n(20));
        assert!(matches!(subscript(&list, &n(2)), Err(Error::Index(_))));
        assert!(matches!(subscript(&list, &n(-1)), Err(Error::Index(_))));
        assert!(matches!(subscript(&n(1), &n(0)), Err(Error::Type(_))));
    }
}
