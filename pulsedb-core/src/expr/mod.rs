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

//! Filter and trigger expression compiler
//!
//! Expressions arrive as strings over the wire, are tokenized and parsed
//! into an AST, then bound against a table schema into a predicate
//! (filters) or an aggregate threshold test (triggers).

pub mod compile;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod trigger;

pub use compile::{CompiledCmp, CompiledFilter};
pub use parser::{CmpOp, Expr, Parser};
pub use trigger::{AggOp, TriggerExpr};
