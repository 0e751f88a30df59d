// vline-parser - Parser for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Recursive-descent parser for VLine.
//!
//! Consumes the lexer's token vector and produces a statement list. The
//! three ambiguous statement heads (`a[i] = …`, `a.b = …`, and a plain
//! expression starting with the same tokens) are resolved by backtracking.

use std::fmt;

use crate::ast::{BinOp, ClassDecl, Expr, FnDecl, Stmt, UnaryOp};
use crate::bignum::BigNum;
use crate::token::Token;

/// Parser error.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

type Result<T> = std::result::Result<T, ParseError>;

fn error<T>(message: impl Into<String>) -> Result<T> {
    Err(ParseError {
        message: message.into(),
    })
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    /// Parses the whole token stream into a statement list.
    pub fn parse(mut self) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !matches!(self.peek(0), Token::Eof) {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.position + offset).unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .unwrap_or(Token::Eof);
        self.position += 1;
        token
    }

    fn expect(&mut self, token: Token, message: &str) -> Result<()> {
        if *self.peek(0) == token {
            self.consume();
            Ok(())
        } else {
            error(format!("{} (found '{}')", message, self.peek(0)))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<String> {
        match self.peek(0) {
            Token::Ident(_) => match self.consume() {
                Token::Ident(name) => Ok(name),
                _ => error(message),
            },
            other => error(format!("{} (found '{}')", message, other)),
        }
    }

    /// Runs `attempt`; on failure, rewinds to the saved position.
    fn backtrack<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Option<T> {
        let saved = self.position;
        match attempt(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.position = saved;
                None
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> Result<Stmt> {
        match (self.peek(0), self.peek(1)) {
            (Token::Ident(_), Token::LBracket) => {
                if let Some(stmt) = self.backtrack(Self::subscript_assignment) {
                    return Ok(stmt);
                }
                Ok(Stmt::Expr(self.expression()?))
            }
            (Token::Ident(_), Token::Assign) => self.assignment(),
            (Token::Ident(_), Token::Dot) => {
                if let Some(stmt) = self.backtrack(Self::member_assignment) {
                    return Ok(stmt);
                }
                Ok(Stmt::Expr(self.expression()?))
            }
            (Token::If, _) => self.if_statement(),
            (Token::While, _) => self.while_statement(),
            (Token::Fn, _) => Ok(Stmt::FnDecl(self.function_declaration()?)),
            (Token::Return, _) => {
                self.consume();
                Ok(Stmt::Return {
                    value: self.expression()?,
                })
            }
            (Token::Break, _) => {
                self.consume();
                Ok(Stmt::Break)
            }
            (Token::Continue, _) => {
                self.consume();
                Ok(Stmt::Continue)
            }
            (Token::For, _) => self.for_statement(),
            (Token::Class, _) => self.class_declaration(),
            (Token::Const, _) => self.constant_declaration(),
            (Token::Import, _) => self.import_statement(),
            (Token::Raise, _) => {
                self.consume();
                Ok(Stmt::Raise {
                    message: self.expression()?,
                })
            }
            _ => Ok(Stmt::Expr(self.expression()?)),
        }
    }

    fn assignment(&mut self) -> Result<Stmt> {
        let target = self.expect_ident("Expected identifier")?;
        self.expect(Token::Assign, "Expected '='")?;
        Ok(Stmt::Assign {
            target,
            index: None,
            value: self.expression()?,
        })
    }

    fn subscript_assignment(&mut self) -> Result<Stmt> {
        let target = self.expect_ident("Expected identifier")?;
        self.expect(Token::LBracket, "Expected '['")?;
        let index = self.expression()?;
        self.expect(Token::RBracket, "Expected ']' after list index")?;
        self.expect(Token::Assign, "Expected '=' after list index")?;
        Ok(Stmt::Assign {
            target,
            index: Some(index),
            value: self.expression()?,
        })
    }

    fn member_assignment(&mut self) -> Result<Stmt> {
        let target = self.expect_ident("Expected identifier")?;
        self.expect(Token::Dot, "Expected '.'")?;
        let member = self.expect_ident("Expected member name")?;
        let index = if *self.peek(0) == Token::LBracket {
            self.consume();
            let index = self.expression()?;
            self.expect(Token::RBracket, "Expected ']' after list index")?;
            Some(index)
        } else {
            None
        };
        self.expect(Token::Assign, "Expected '=' after member name")?;
        Ok(Stmt::MemberAssign {
            target,
            member,
            index,
            value: self.expression()?,
        })
    }

    /// Collects statements until one of the closing keywords; the closer is
    /// left unconsumed.
    fn block_body(&mut self, closers: &[Token]) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            match self.peek(0) {
                Token::Eof => return error("Expected 'end' to close block"),
                token if closers.contains(token) => return Ok(body),
                _ => body.push(self.statement()?),
            }
        }
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume();
        let condition = self.expression()?;
        let body = self.block_body(&[Token::Elif, Token::Else, Token::End])?;

        let mut elifs = Vec::new();
        while *self.peek(0) == Token::Elif {
            self.consume();
            let elif_condition = self.expression()?;
            let elif_body = self.block_body(&[Token::Elif, Token::Else, Token::End])?;
            elifs.push((elif_condition, elif_body));
        }

        let else_body = if *self.peek(0) == Token::Else {
            self.consume();
            self.block_body(&[Token::End])?
        } else {
            Vec::new()
        };

        self.expect(Token::End, "Expected 'end' to close if statement")?;
        Ok(Stmt::If {
            condition,
            body,
            elifs,
            else_body,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume();
        let condition = self.expression()?;
        let body = self.block_body(&[Token::End])?;
        self.expect(Token::End, "Expected 'end' to close while loop")?;
        Ok(Stmt::While { condition, body })
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume();
        let variable = self.expect_ident("Expected identifier after 'for'")?;
        self.expect(Token::In, "Expected 'in' after for loop variable")?;
        let iterable = self.expression()?;
        let body = self.block_body(&[Token::End])?;
        self.expect(Token::End, "Expected 'end' to close for loop")?;
        Ok(Stmt::For {
            variable,
            iterable,
            body,
        })
    }

    fn function_declaration(&mut self) -> Result<FnDecl> {
        self.consume();
        let name = self.expect_ident("Expected function name after 'fn'")?;
        self.expect(Token::LParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        let mut defaults = Vec::new();
        while *self.peek(0) != Token::RParen {
            params.push(self.expect_ident("Expected parameter name")?);
            if *self.peek(0) == Token::Assign {
                self.consume();
                defaults.push(Some(self.expression()?));
            } else {
                defaults.push(None);
            }
            if *self.peek(0) == Token::Comma {
                self.consume();
            } else if *self.peek(0) != Token::RParen {
                return error("Expected ',' or ')' in parameter list");
            }
        }
        self.consume();

        let body = self.block_body(&[Token::End])?;
        self.expect(Token::End, "Expected 'end' to close function")?;
        Ok(FnDecl {
            name,
            params,
            defaults,
            body,
        })
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        self.consume();
        let name = self.expect_ident("Expected class name after 'class'")?;
        let parent = if *self.peek(0) == Token::Colon {
            self.consume();
            Some(self.expect_ident("Expected class name after ':'")?)
        } else {
            None
        };

        let mut members: Vec<(String, Expr)> = Vec::new();
        let mut methods: Vec<FnDecl> = Vec::new();
        loop {
            match self.peek(0) {
                Token::Eof => return error("Expected 'end' to close class"),
                Token::End => break,
                Token::Fn => {
                    let method = self.function_declaration()?;
                    methods.retain(|m| m.name != method.name);
                    methods.push(method);
                }
                _ => match self.statement()? {
                    Stmt::Assign {
                        target,
                        index: None,
                        value,
                    } => {
                        if let Some(slot) = members.iter_mut().find(|(n, _)| *n == target) {
                            slot.1 = value;
                        } else {
                            members.push((target, value));
                        }
                    }
                    _ => return error("Unsupported statement in class declaration"),
                },
            }
        }
        self.consume();

        Ok(Stmt::ClassDecl(ClassDecl {
            name,
            parent,
            members,
            methods,
        }))
    }

    fn constant_declaration(&mut self) -> Result<Stmt> {
        self.consume();
        let name = self.expect_ident("Expected identifier after 'const'")?;
        self.expect(Token::Assign, "Expected '=' after constant name")?;
        Ok(Stmt::ConstDecl {
            name,
            value: self.expression()?,
        })
    }

    fn import_statement(&mut self) -> Result<Stmt> {
        self.consume();
        match self.peek(0) {
            Token::Str(_) => match self.consume() {
                Token::Str(package) => Ok(Stmt::Import { package }),
                _ => error("Expected string literal after 'import'"),
            },
            _ => error("Expected string literal after 'import'"),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Expr> {
        self.or_expression()
    }

    fn binary_ladder(
        &mut self,
        next: impl Fn(&mut Self) -> Result<Expr>,
        op_for: impl Fn(&Token) -> Option<BinOp>,
    ) -> Result<Expr> {
        let mut left = next(self)?;
        while let Some(op) = op_for(self.peek(0)) {
            self.consume();
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn or_expression(&mut self) -> Result<Expr> {
        self.binary_ladder(Self::and_expression, |t| match t {
            Token::Or => Some(BinOp::Or),
            _ => None,
        })
    }

    fn and_expression(&mut self) -> Result<Expr> {
        self.binary_ladder(Self::equality_expression, |t| match t {
            Token::And => Some(BinOp::And),
            _ => None,
        })
    }

    fn equality_expression(&mut self) -> Result<Expr> {
        self.binary_ladder(Self::comparison_expression, |t| match t {
            Token::EqEq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::Ne),
            _ => None,
        })
    }

    fn comparison_expression(&mut self) -> Result<Expr> {
        self.binary_ladder(Self::arithmetic_expression, |t| match t {
            Token::Lt => Some(BinOp::Lt),
            Token::Le => Some(BinOp::Le),
            Token::Gt => Some(BinOp::Gt),
            Token::Ge => Some(BinOp::Ge),
            _ => None,
        })
    }

    fn arithmetic_expression(&mut self) -> Result<Expr> {
        self.binary_ladder(Self::term, |t| match t {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_ladder(Self::factor, |t| match t {
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Percent => Some(BinOp::Mod),
            Token::Caret => Some(BinOp::Pow),
            Token::Amp => Some(BinOp::BitAnd),
            Token::Pipe => Some(BinOp::BitOr),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<Expr> {
        match self.peek(0) {
            Token::Minus => {
                self.consume();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(self.factor()?),
                })
            }
            Token::Tilde => {
                self.consume();
                Ok(Expr::Unary {
                    op: UnaryOp::BitNot,
                    expr: Box::new(self.factor()?),
                })
            }
            Token::Not => {
                self.consume();
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(self.primary()?),
                })
            }
            _ => self.primary(),
        }
    }

    fn argument_list(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if *self.peek(0) != Token::RParen {
            loop {
                args.push(self.expression()?);
                if *self.peek(0) == Token::Comma {
                    self.consume();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    fn identifier_expression(&mut self, name: String) -> Result<Expr> {
        let mut path = vec![name];

        while *self.peek(0) == Token::Dot {
            self.consume();
            let member = self.expect_ident("Expected member name")?;

            if *self.peek(0) == Token::LParen {
                self.consume();
                let args = self.argument_list()?;
                let full = format!("{}.{}", path.join("."), member);
                return Ok(Expr::Call { name: full, args });
            }

            path.push(member);
            if *self.peek(0) == Token::LBracket {
                self.consume();
                let index = self.expression()?;
                self.expect(Token::RBracket, "Expected ']' after list index")?;
                return Ok(Expr::Member {
                    path,
                    index: Some(Box::new(index)),
                });
            }
        }

        if path.len() > 1 {
            return Ok(Expr::Member { path, index: None });
        }

        let name = path.remove(0);
        match self.peek(0) {
            Token::LParen => {
                self.consume();
                let args = self.argument_list()?;
                Ok(Expr::Call { name, args })
            }
            Token::LBracket => {
                self.consume();
                let index = self.expression()?;
                self.expect(Token::RBracket, "Expected ']' after list index")?;
                Ok(Expr::Binary {
                    op: BinOp::Index,
                    left: Box::new(Expr::Ident(name)),
                    right: Box::new(index),
                })
            }
            _ => Ok(Expr::Ident(name)),
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.consume() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::True => Ok(Expr::Number(BigNum::from(1))),
            Token::False => Ok(Expr::Number(BigNum::from(0))),
            Token::Null => Ok(Expr::Null),
            Token::Not => Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(self.primary()?),
            }),
            Token::Ident(name) => self.identifier_expression(name),
            Token::LParen => {
                let expr = self.expression()?;
                self.expect(Token::RParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            Token::LBracket => {
                let mut elements = Vec::new();
                if *self.peek(0) != Token::RBracket {
                    loop {
                        elements.push(self.expression()?);
                        match self.peek(0) {
                            Token::RBracket => break,
                            Token::Comma => {
                                self.consume();
                            }
                            _ => return error("Expected ',' or ']' in list literal"),
                        }
                    }
                }
                self.consume();
                Ok(Expr::List(elements))
            }
            Token::New => {
                let class = self.expect_ident("Expected class name after 'new'")?;
                if *self.peek(0) == Token::LParen {
                    self.consume();
                    let args = self.argument_list()?;
                    Ok(Expr::New {
                        class,
                        args,
                        has_parens: true,
                    })
                } else {
                    Ok(Expr::New {
                        class,
                        args: Vec::new(),
                        has_parens: false,
                    })
                }
            }
            other => error(format!(
                "Unexpected token in primary expression: '{}'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Vec<Stmt> {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    #[test]
    fn assignment_forms() {
        assert!(matches!(
            &parse("x = 1")[0],
            Stmt::Assign { index: None, .. }
        ));
        assert!(matches!(
            &parse("x[0] = 1")[0],
            Stmt::Assign { index: Some(_), .. }
        ));
        assert!(matches!(&parse("x.m = 1")[0], Stmt::MemberAssign { .. }));
    }

    #[test]
    fn ambiguous_heads_fall_back_to_expressions() {
        assert!(matches!(&parse("x[0] + 1")[0], Stmt::Expr(_)));
        assert!(matches!(
            &parse("x.inc()")[0],
            Stmt::Expr(Expr::Call { .. })
        ));
    }

    #[test]
    fn dotted_call_names() {
        match &parse("a.b.move(1)")[0] {
            Stmt::Expr(Expr::Call { name, args }) => {
                assert_eq!(name, "a.b.move");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        match &parse("1 + 2 * 3")[0] {
            Stmt::Expr(Expr::Binary {
                op: BinOp::Add,
                right,
                ..
            }) => {
                assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn function_defaults() {
        match &parse("fn f(a, b=10) return a end")[0] {
            Stmt::FnDecl(decl) => {
                assert_eq!(decl.params, vec!["a", "b"]);
                assert!(decl.defaults[0].is_none());
                assert!(decl.defaults[1].is_some());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn class_with_parent_and_members() {
        match &parse("class Dog : Animal sound = \"woof\" fn bark() return self.sound end end")[0]
        {
            Stmt::ClassDecl(cls) => {
                assert_eq!(cls.name, "Dog");
                assert_eq!(cls.parent.as_deref(), Some("Animal"));
                assert_eq!(cls.members.len(), 1);
                assert_eq!(cls.methods.len(), 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn new_with_and_without_parens() {
        assert!(matches!(
            &parse("x = new C")[0],
            Stmt::Assign {
                value: Expr::New {
                    has_parens: false,
                    ..
                },
                ..
            }
        ));
        assert!(matches!(
            &parse("x = new C(1)")[0],
            Stmt::Assign {
                value: Expr::New {
                    has_parens: true,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn loop_controls_parse() {
        let stmts = parse("while 1 break continue end");
        match &stmts[0] {
            Stmt::While { body, .. } => {
                assert_eq!(body.len(), 2);
                assert!(matches!(body[0], Stmt::Break));
                assert!(matches!(body[1], Stmt::Continue));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unterminated_block_errors() {
        let tokens = Lexer::new("if 1 x = 2").tokenize().unwrap();
        assert!(Parser::new(tokens).parse().is_err());
    }
}
