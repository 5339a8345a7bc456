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

//! Trigger expression parsing
//!
//! ```text
//! trigger := AGG "(" [ident] ")" OP literal
//! AGG     := "COUNT" | "SUM" | "MIN" | "MAX"
//! ```
//!
//! COUNT takes no column; the other aggregates require one numeric
//! column of the bound schema.

use super::lexer::Lexer;
use super::parser::CmpOp;
use super::token::{Token, TokenKind};
use crate::error::{PulseError, Result};
use crate::schema::{Column, Schema};
use std::cmp::Ordering;
use std::fmt;

/// Aggregate operator over a time bucket of filter matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggOp {
    Count,
    Sum,
    Min,
    Max,
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggOp::Count => write!(f, "COUNT"),
            AggOp::Sum => write!(f, "SUM"),
            AggOp::Min => write!(f, "MIN"),
            AggOp::Max => write!(f, "MAX"),
        }
    }
}

/// A compiled trigger expression bound to one schema
#[derive(Debug, Clone)]
pub struct TriggerExpr {
    pub op: AggOp,
    /// Aggregated column; None for COUNT
    pub column: Option<Column>,
    pub cmp: CmpOp,
    pub threshold: f64,
}

impl TriggerExpr {
    /// Parse and bind a trigger expression string against `schema`
    pub fn compile(input: &str, schema: &Schema) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut pos = 0usize;
        let next = |pos: &mut usize| -> Token {
            let tok = tokens[(*pos).min(tokens.len() - 1)].clone();
            *pos += 1;
            tok
        };

        let agg_tok = next(&mut pos);
        let op = match &agg_tok.kind {
            TokenKind::Identifier(name) => match name.as_str() {
                "COUNT" => AggOp::Count,
                "SUM" => AggOp::Sum,
                "MIN" => AggOp::Min,
                "MAX" => AggOp::Max,
                other => {
                    return Err(PulseError::parse(
                        agg_tok.pos,
                        format!("Unknown aggregate '{}'", other),
                    ));
                }
            },
            other => {
                return Err(PulseError::parse(
                    agg_tok.pos,
                    format!("Expected aggregate, found '{}'", other),
                ));
            }
        };

        let open = next(&mut pos);
        if open.kind != TokenKind::LParen {
            return Err(PulseError::parse(open.pos, "Expected '('"));
        }

        let mut column = None;
        let tok = next(&mut pos);
        let close = match tok.kind {
            TokenKind::RParen => tok,
            TokenKind::Identifier(name) => {
                let col = schema.column(&name).ok_or_else(|| {
                    PulseError::parse(tok.pos, format!("Unknown column '{}'", name))
                })?;
                if !col.ty.is_numeric() {
                    return Err(PulseError::parse(
                        tok.pos,
                        format!("Column '{}' of type {} is not numeric", name, col.ty),
                    ));
                }
                column = Some(col.clone());
                next(&mut pos)
            }
            other => {
                return Err(PulseError::parse(
                    tok.pos,
                    format!("Expected column or ')', found '{}'", other),
                ));
            }
        };
        if close.kind != TokenKind::RParen {
            return Err(PulseError::parse(close.pos, "Expected ')'"));
        }

        match (op, &column) {
            (AggOp::Count, Some(_)) => {
                return Err(PulseError::parse(agg_tok.pos, "COUNT takes no column"));
            }
            (AggOp::Sum | AggOp::Min | AggOp::Max, None) => {
                return Err(PulseError::parse(
                    agg_tok.pos,
                    format!("{} requires a column", op),
                ));
            }
            _ => {}
        }

        let op_tok = next(&mut pos);
        let cmp = match op_tok.kind {
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

        let lit_tok = next(&mut pos);
        let threshold = match lit_tok.kind {
            TokenKind::Integer(v) => v as f64,
            TokenKind::Float(v) => v,
            other => {
                return Err(PulseError::parse(
                    lit_tok.pos,
                    format!("Expected numeric threshold, found '{}'", other),
                ));
            }
        };

        let eof = next(&mut pos);
        if eof.kind != TokenKind::Eof {
            return Err(PulseError::parse(
                eof.pos,
                format!("Unexpected trailing token '{}'", eof.kind),
            ));
        }

        Ok(Self {
            op,
            column,
            cmp,
            threshold,
        })
    }

    /// Evaluate the predicate against an aggregate value
    pub fn fires(&self, value: f64) -> bool {
        match value.partial_cmp(&self.threshold) {
            Some(ord) => match self.cmp {
                CmpOp::Eq => ord == Ordering::Equal,
                CmpOp::Ne => ord != Ordering::Equal,
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::Le => ord != Ordering::Greater,
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::Ge => ord != Ordering::Less,
            },
            None => false,
        }
    }
}

impl fmt::Display for TriggerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(col) => write!(f, "{}({}) {} {}", self.op, col.name, self.cmp, self.threshold),
            None => write!(f, "{}() {} {}", self.op, self.cmp, self.threshold),
        }
    }
}
