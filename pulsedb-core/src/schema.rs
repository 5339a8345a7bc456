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

//! Table schemas and the fixed record layout
//!
//! A schema is an ordered list of typed columns with an implicit leading
//! `timestamp: LONG` (nanoseconds since epoch). The record layout is the
//! packed concatenation of column encodings; `record_size` is the sum of
//! column widths and is immutable after table creation.

use crate::error::{PulseError, Result};
use crate::types::{ColumnType, Value};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Name of the implicit leading timestamp column
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Width of the implicit timestamp column (int64 nanoseconds)
pub const TIMESTAMP_WIDTH: usize = 8;

/// One column of a schema: name, type, and its position in the record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    /// Byte offset of this column within a record
    pub offset: usize,
}

impl Column {
    /// Encoded width in bytes
    pub fn width(&self) -> usize {
        self.ty.width()
    }

    /// Decode this column's value out of a full record
    pub fn value(&self, record: &[u8]) -> Value {
        self.ty.decode(&record[self.offset..self.offset + self.width()])
    }
}

/// An immutable record schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
    record_size: usize,
}

impl Schema {
    /// All columns, including the implicit timestamp at index 0
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Fixed encoded size of one record
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Look up a column by name (case-sensitive)
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The record's timestamp in nanoseconds
    pub fn timestamp(&self, record: &[u8]) -> i64 {
        LittleEndian::read_i64(&record[..TIMESTAMP_WIDTH])
    }

    /// The record's millisecond time bucket
    pub fn time_bucket_ms(&self, record: &[u8]) -> i64 {
        self.timestamp(record) / 1_000_000
    }

    /// Render a record as `name=value` pairs for diagnostics
    pub fn format_record(&self, record: &[u8]) -> String {
        let mut out = String::new();
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}={}", col.name, col.value(record));
        }
        out
    }
}

/// Builds a schema from `(type, name)` pairs, prepending the implicit
/// timestamp column.
///
/// ```
/// use pulsedb_core::schema::SchemaBuilder;
/// use pulsedb_core::types::ColumnType;
///
/// let schema = SchemaBuilder::new()
///     .add_column(ColumnType::Long, "e")
///     .add_column(ColumnType::String(16), "h")
///     .build()
///     .unwrap();
/// assert_eq!(schema.record_size(), 8 + 8 + 16);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<(ColumnType, String)>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(mut self, ty: ColumnType, name: impl Into<String>) -> Self {
        self.columns.push((ty, name.into()));
        self
    }

    /// Finalize the layout. Fails on duplicate column names, a
    /// user-supplied `timestamp` column, or a zero-width string column.
    pub fn build(self) -> Result<Schema> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column {
            name: TIMESTAMP_COLUMN.to_string(),
            ty: ColumnType::Long,
            offset: 0,
        });
        let mut offset = TIMESTAMP_WIDTH;

        for (ty, name) in self.columns {
            if columns.iter().any(|c: &Column| c.name == name) {
                return Err(PulseError::Schema(format!("Duplicate column {}", name)));
            }
            if let ColumnType::String(n) = ty {
                if n == 0 {
                    return Err(PulseError::Schema(format!(
                        "Column {} has zero-width string type",
                        name
                    )));
                }
            }
            let width = ty.width();
            columns.push(Column { name, ty, offset });
            offset += width;
        }

        Ok(Schema {
            columns,
            record_size: offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eight_column_schema() -> Schema {
        SchemaBuilder::new()
            .add_column(ColumnType::Bool, "a")
            .add_column(ColumnType::Char, "b")
            .add_column(ColumnType::Short, "c")
            .add_column(ColumnType::Int, "d")
            .add_column(ColumnType::Long, "e")
            .add_column(ColumnType::Float, "f")
            .add_column(ColumnType::Double, "g")
            .add_column(ColumnType::String(16), "h")
            .build()
            .unwrap()
    }

    #[test]
    fn test_layout_offsets() {
        let s = eight_column_schema();
        // timestamp(8) a(1) b(1) c(2) d(4) e(8) f(4) g(8) h(16)
        assert_eq!(s.record_size(), 52);
        assert_eq!(s.column("timestamp").unwrap().offset, 0);
        assert_eq!(s.column("a").unwrap().offset, 8);
        assert_eq!(s.column("b").unwrap().offset, 9);
        assert_eq!(s.column("c").unwrap().offset, 10);
        assert_eq!(s.column("d").unwrap().offset, 12);
        assert_eq!(s.column("e").unwrap().offset, 16);
        assert_eq!(s.column("f").unwrap().offset, 24);
        assert_eq!(s.column("g").unwrap().offset, 28);
        assert_eq!(s.column("h").unwrap().offset, 32);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = SchemaBuilder::new()
            .add_column(ColumnType::Int, "x")
            .add_column(ColumnType::Long, "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, PulseError::Schema(_)));
    }

    #[test]
    fn test_implicit_timestamp_reserved() {
        let err = SchemaBuilder::new()
            .add_column(ColumnType::Long, "timestamp")
            .build()
            .unwrap_err();
        assert!(matches!(err, PulseError::Schema(_)));
    }

    #[test]
    fn test_zero_width_string_rejected() {
        let err = SchemaBuilder::new()
            .add_column(ColumnType::String(0), "s")
            .build()
            .unwrap_err();
        assert!(matches!(err, PulseError::Schema(_)));
    }

    #[test]
    fn test_timestamp_bucket() {
        let s = SchemaBuilder::new()
            .add_column(ColumnType::Int, "v")
            .build()
            .unwrap();
        let mut rec = vec![0u8; s.record_size()];
        LittleEndian::write_i64(&mut rec[..8], 5_250_000); // 5.25 ms
        assert_eq!(s.timestamp(&rec), 5_250_000);
        assert_eq!(s.time_bucket_ms(&rec), 5);
    }
}
