// vline-parser - Runtime value model for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! The uniform tagged value used by the compiler and the virtual machine.
//!
//! Values carry full copy semantics: assigning or passing a value never
//! aliases it. Lists and objects keep that affordable through `im`'s
//! persistent containers, which share structure until mutated.

use std::fmt;

use im::{OrdMap, Vector};

use crate::bignum::BigNum;

/// Payload of an object value: named members plus bound methods.
///
/// Method handles are indices into the compiler's function table; the two
/// name spaces are independent (a member and a method may share a name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectData {
    pub members: OrdMap<String, Value>,
    pub methods: OrdMap<String, usize>,
}

/// A VLine value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Num(BigNum),
    Str(String),
    List(Vector<Value>),
    Object(ObjectData),
}

impl Value {
    pub fn number(n: BigNum) -> Value {
        Value::Num(n)
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Vector::from(items))
    }

    /// The single truthiness rule of the language, used by conditional
    /// jumps and by `and`/`or`: non-zero numbers, non-empty strings and
    /// lists, and objects are true; null is false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Num(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Object(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<BigNum> for Value {
    fn from(n: BigNum) -> Self {
        Value::Num(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Num(BigNum::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Num(BigNum::from(if b { 1 } else { 0 }))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Num(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => {
                write!(f, "{{")?;
                for (i, (name, value)) in obj.members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::from(0).truthy());
        assert!(Value::from(-3).truthy());
        assert!(!Value::string("").truthy());
        assert!(Value::string("x").truthy());
        assert!(!Value::list(vec![]).truthy());
        assert!(Value::list(vec![Value::Null]).truthy());
        assert!(Value::Object(ObjectData::default()).truthy());
    }

    #[test]
    fn equality_is_same_tag_structural() {
        assert_eq!(Value::from(3), Value::from(3));
        assert_ne!(Value::from(3), Value::string("3"));
        assert_ne!(Value::Null, Value::from(0));
        assert_eq!(
            Value::list(vec![Value::from(1), Value::string("a")]),
            Value::list(vec![Value::from(1), Value::string("a")])
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(
            Value::list(vec![Value::from(1), Value::from(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(Value::Null.to_string(), "null");
    }
}
