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

//! Compilation of parsed expressions against a schema
//!
//! Binding resolves column names to record offsets and type-checks each
//! comparison, producing a predicate tree evaluated directly over raw
//! record bytes. The compiled form also exposes the referenced column
//! set and the top-level conjuncts, which the query planner uses to
//! pick an index.

use super::parser::{CmpOp, Expr, Parser};
use crate::error::{PulseError, Result};
use crate::schema::{Column, Schema};
use crate::types::{ColumnType, Literal};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A bound comparison: column resolved to its layout slot
#[derive(Debug, Clone)]
pub struct CompiledCmp {
    pub column: Column,
    pub op: CmpOp,
    pub literal: Literal,
}

impl CompiledCmp {
    fn eval(&self, record: &[u8]) -> bool {
        let value = self.column.value(record);
        match self.literal.compare(&value) {
            Some(ord) => match self.op {
                CmpOp::Eq => ord == Ordering::Equal,
                CmpOp::Ne => ord != Ordering::Equal,
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::Le => ord != Ordering::Greater,
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::Ge => ord != Ordering::Less,
            },
            // Incomparable pairs are rejected at bind time; NaN lands here.
            None => false,
        }
    }
}

/// Bound predicate tree
#[derive(Debug, Clone)]
enum Node {
    Cmp(CompiledCmp),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

impl Node {
    fn eval(&self, record: &[u8]) -> bool {
        match self {
            Node::Cmp(cmp) => cmp.eval(record),
            Node::And(a, b) => a.eval(record) && b.eval(record),
            Node::Or(a, b) => a.eval(record) || b.eval(record),
            Node::Not(inner) => !inner.eval(record),
        }
    }
}

/// A compiled filter predicate bound to one schema
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    source: String,
    root: Node,
    columns: HashSet<String>,
}

impl CompiledFilter {
    /// Parse and bind `input` against `schema`
    pub fn compile(input: &str, schema: &Schema) -> Result<Self> {
        let ast = Parser::parse(input)?;
        let mut columns = HashSet::new();
        let root = bind(&ast, schema, &mut columns)?;
        Ok(Self {
            source: input.to_string(),
            root,
            columns,
        })
    }

    /// Evaluate the predicate over one record
    pub fn matches(&self, record: &[u8]) -> bool {
        self.root.eval(record)
    }

    /// Names of all columns the expression references
    pub fn columns(&self) -> &HashSet<String> {
        &self.columns
    }

    /// The original expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Comparisons that are necessary conditions of the whole predicate:
    /// those reachable from the root through `&&` only. Any of them can
    /// drive an index lookup with a full re-check, without losing
    /// matches hidden behind `||` or `!`.
    pub fn conjuncts(&self) -> Vec<&CompiledCmp> {
        let mut out = Vec::new();
        collect_conjuncts(&self.root, &mut out);
        out
    }
}

fn collect_conjuncts<'a>(node: &'a Node, out: &mut Vec<&'a CompiledCmp>) {
    match node {
        Node::Cmp(cmp) => out.push(cmp),
        Node::And(a, b) => {
            collect_conjuncts(a, out);
            collect_conjuncts(b, out);
        }
        Node::Or(_, _) | Node::Not(_) => {}
    }
}

fn bind(expr: &Expr, schema: &Schema, columns: &mut HashSet<String>) -> Result<Node> {
    match expr {
        Expr::Cmp {
            column,
            op,
            literal,
            pos,
        } => {
            let col = schema.column(column).ok_or_else(|| {
                PulseError::parse(*pos, format!("Unknown column '{}'", column))
            })?;
            check_comparable(col, *op, literal, *pos)?;
            columns.insert(column.clone());
            Ok(Node::Cmp(CompiledCmp {
                column: col.clone(),
                op: *op,
                literal: literal.clone(),
            }))
        }
        Expr::And(a, b) => Ok(Node::And(
            Box::new(bind(a, schema, columns)?),
            Box::new(bind(b, schema, columns)?),
        )),
        Expr::Or(a, b) => Ok(Node::Or(
            Box::new(bind(a, schema, columns)?),
            Box::new(bind(b, schema, columns)?),
        )),
        Expr::Not(inner) => Ok(Node::Not(Box::new(bind(inner, schema, columns)?))),
    }
}

fn check_comparable(col: &Column, op: CmpOp, literal: &Literal, pos: usize) -> Result<()> {
    let ok = match (&col.ty, literal) {
        (ColumnType::Bool, Literal::Bool(_)) => matches!(op, CmpOp::Eq | CmpOp::Ne),
        (ColumnType::Char, Literal::Str(s)) => s.len() == 1,
        (ColumnType::Char, Literal::Int(_)) => true,
        (ColumnType::String(_), Literal::Str(_)) => true,
        (ty, Literal::Int(_) | Literal::Float(_)) if ty.is_numeric() => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(PulseError::parse(
            pos,
            format!(
                "Cannot compare column '{}' of type {} against {}",
                col.name, col.ty, literal
            ),
        ))
    }
}
