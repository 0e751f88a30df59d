// vline-parser - Abstract syntax tree for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Statement and expression trees produced by the parser.
//!
//! Both are plain tagged sums; the compiler dispatches by matching on the
//! variant. Operators are enums, with their source spelling kept only for
//! error messages.

use std::fmt;

use crate::bignum::BigNum;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitOr,
    BitAnd,
    BitNot,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    /// Subscripting; always lowered to a dedicated instruction.
    Index,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::BitOr => "|",
            BinOp::BitAnd => "&",
            BinOp::BitNot => "~",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Index => "[]",
        };
        write!(f, "{}", symbol)
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(BigNum),
    Str(String),
    Null,
    List(Vec<Expr>),
    Ident(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    /// A call; `name` may be dotted (`obj.method`, `a.b.method`).
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// `new Cls` or `new Cls(args)`. `has_parens` distinguishes the two:
    /// only the parenthesised form triggers `__init__`.
    New {
        class: String,
        args: Vec<Expr>,
        has_parens: bool,
    },
    /// Member access `a.b[.c…][i]`; `path[0]` is the root identifier.
    Member {
        path: Vec<String>,
        index: Option<Box<Expr>>,
    },
}

/// A function declaration, also used for class methods.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<String>,
    /// One entry per parameter; `None` for parameters without a default.
    pub defaults: Vec<Option<Expr>>,
    pub body: Vec<Stmt>,
}

/// A class declaration. Members and methods keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub members: Vec<(String, Expr)>,
    pub methods: Vec<FnDecl>,
}

impl ClassDecl {
    pub fn method(&self, name: &str) -> Option<&FnDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import {
        package: String,
    },
    ConstDecl {
        name: String,
        value: Expr,
    },
    /// `target = value` or `target[index] = value`.
    Assign {
        target: String,
        index: Option<Expr>,
        value: Expr,
    },
    If {
        condition: Expr,
        body: Vec<Stmt>,
        elifs: Vec<(Expr, Vec<Stmt>)>,
        else_body: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        variable: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    FnDecl(FnDecl),
    Return {
        value: Expr,
    },
    Break,
    Continue,
    ClassDecl(ClassDecl),
    /// `target.member = value` or `target.member[index] = value`.
    MemberAssign {
        target: String,
        member: String,
        index: Option<Expr>,
        value: Expr,
    },
    Raise {
        message: Expr,
    },
    Expr(Expr),
}
