// SPDX-License-Identifier: AGPL-3.0-or-later
// PulseDB - Streaming Telemetry Log Engine
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Recursive descent parser for the filter expression grammar
//!
//! ```text
//! expr    := or
//! or      := and ("||" and)*
//! and     := not ("&&" not)*
//! not     := "!" not | cmp
//! cmp     := ident OP literal | "(" expr ")"
//! OP      := "==" | "!=" | "<" | "<=" | ">" | ">="
//! literal := number | quoted-string | "true" | "false"
//! ```

use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::error::{PulseError, Result};
use crate::types::Literal;
use std::fmt;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmpOp::Eq => write!(f, "=="),
            CmpOp::Ne => write!(f, "!="),
            CmpOp::Lt => write!(f, "<"),
            CmpOp::Le => write!(f, "<="),
            CmpOp::Gt => write!(f, ">"),
            CmpOp::Ge => write!(f, ">="),
        }
    }
}

/// Unbound expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Cmp {
        column: String,
        op: CmpOp,
        literal: Literal,
        /// Byte position of the column identifier, for bind errors
        pos: usize,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// Expression parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parse an expression string into an AST
    pub fn parse(input: &str) -> Result<Expr> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        parser.expect_eof()?;
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> Result<()> {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(PulseError::parse(
                tok.pos,
                format!("Unexpected trailing token '{}'", tok.kind),
            ))
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.peek().kind == TokenKind::OrOr {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_not()?;
        while self.peek().kind == TokenKind::AndAnd {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.peek().kind == TokenKind::Bang {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                let close = self.advance();
                if close.kind != TokenKind::RParen {
                    return Err(PulseError::parse(close.pos, "Expected ')'"));
                }
                Ok(inner)
            }
            TokenKind::Identifier(column) => {
                let op_tok = self.advance();
                let op = match op_tok.kind {
                    TokenKind::EqEq => CmpOp::Eq,
                    TokenKind::NotEq => CmpOp::Ne,
                    TokenKind::Lt => CmpOp::Lt,
                    TokenKind::LtEq => CmpOp::Le,
                    TokenKind::Gt => CmpOp::Gt,
                    TokenKind::GtEq => CmpOp::Ge,
                    other => {
                        return Err(PulseError::parse(
                            op_tok.pos,
                            format!("Expected comparison operator, found '{}'", other),
                        ));
                    }
                };
                let lit_tok = self.advance();
                let literal = match lit_tok.kind {
                    TokenKind::Integer(v) => Literal::Int(v),
                    TokenKind::Float(v) => Literal::Float(v),
                    TokenKind::String(s) => Literal::Str(s),
                    TokenKind::True => Literal::Bool(true),
                    TokenKind::False => Literal::Bool(false),
                    other => {
                        return Err(PulseError::parse(
                            lit_tok.pos,
                            format!("Expected literal, found '{}'", other),
                        ));
                    }
                };
                Ok(Expr::Cmp {
                    column,
                    op,
                    literal,
                    pos: tok.pos,
                })
            }
            other => Err(PulseError::parse(
                tok.pos,
                format!("Expected column or '(', found '{}'", other),
            )),
        }
    }
}
