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

//! PulseDB Core
//!
//! Fundamental types for the PulseDB log-table engine:
//!
//! - **Column types**: fixed-width BOOL/CHAR/SHORT/INT/LONG/FLOAT/DOUBLE
//!   and zero-padded STRING(n)
//! - **Schemas**: ordered typed columns with an implicit leading
//!   `timestamp: LONG` (nanoseconds) and a packed record layout
//! - **Expression compiler**: filter predicates (`e > 500 && a == true`)
//!   and trigger aggregates (`COUNT() > 2`) compiled against a schema
//! - **Record batches** for bulk append
//!
//! # Example
//!
//! ```rust
//! use pulsedb_core::schema::SchemaBuilder;
//! use pulsedb_core::types::ColumnType;
//! use pulsedb_core::expr::CompiledFilter;
//!
//! let schema = SchemaBuilder::new()
//!     .add_column(ColumnType::Bool, "a")
//!     .add_column(ColumnType::Long, "e")
//!     .build()
//!     .unwrap();
//!
//! let filter = CompiledFilter::compile("e > 500", &schema).unwrap();
//! assert!(filter.columns().contains("e"));
//! ```

pub mod error;
pub mod expr;
pub mod record;
pub mod schema;
pub mod types;

pub use error::{PulseError, Result};
pub use expr::{AggOp, CmpOp, CompiledFilter, TriggerExpr};
pub use record::{RecordBatch, RecordBatchBuilder};
pub use schema::{Column, Schema, SchemaBuilder, TIMESTAMP_COLUMN};
pub use types::{ColumnType, Literal, Value};

/// Engine version
pub const PULSEDB_VERSION: &str = env!("CARGO_PKG_VERSION");
