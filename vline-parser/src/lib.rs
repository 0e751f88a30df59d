// vline-parser - Lexer, parser, and value model for the VLine programming language
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! # vline-parser
//!
//! Lexer and parser for the VLine programming language, together with the
//! two leaf types everything else builds on: the arbitrary-precision
//! decimal [`BigNum`] and the runtime [`Value`] model.

pub mod ast;
pub mod bignum;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use bignum::{BigNum, DECIMAL_LIMIT, ParseBigNumError};
pub use im::{OrdMap, Vector};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use token::Token;
pub use value::{ObjectData, Value};

use ast::Stmt;

/// Lexes and parses a complete source string.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| ParseError {
            message: e.to_string(),
        })?;
    Parser::new(tokens).parse()
}
