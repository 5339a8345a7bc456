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

//! Named filters with millisecond time partitioning
//!
//! A named filter is a compiled predicate evaluated on every append
//! from the moment it is registered. Matching offsets are recorded in
//! a time index keyed by the record's millisecond bucket, supporting
//! windowed queries in append order within each bucket.

use parking_lot::RwLock;
use pulsedb_core::CompiledFilter;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A registered filter and its time index
pub struct NamedFilter {
    name: String,
    expr: Arc<CompiledFilter>,
    /// ms bucket -> offsets of matching records, in append order
    time_index: RwLock<BTreeMap<i64, Vec<u64>>>,
}

impl NamedFilter {
    pub fn new(name: impl Into<String>, expr: CompiledFilter) -> Self {
        Self {
            name: name.into(),
            expr: Arc::new(expr),
            time_index: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Arc<CompiledFilter> {
        &self.expr
    }

    /// Evaluate the filter on a freshly appended record. On a match the
    /// offset is recorded under the record's ms bucket. Returns whether
    /// the record matched.
    pub fn observe(&self, offset: u64, record: &[u8], bucket_ms: i64) -> bool {
        if !self.expr.matches(record) {
            return false;
        }
        self.time_index
            .write()
            .entry(bucket_ms)
            .or_default()
            .push(offset);
        true
    }

    /// Offsets of matches whose ms bucket lies in `[begin_ms, end_ms]`,
    /// ascending by bucket then append order within each bucket
    pub fn offsets_in_range(&self, begin_ms: i64, end_ms: i64) -> Vec<u64> {
        if begin_ms > end_ms {
            return Vec::new();
        }
        let index = self.time_index.read();
        let mut out = Vec::new();
        for (_, offsets) in index.range(begin_ms..=end_ms) {
            out.extend_from_slice(offsets);
        }
        out
    }

    /// Total number of matches recorded since registration
    pub fn num_matches(&self) -> u64 {
        self.time_index.read().values().map(|v| v.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};
    use pulsedb_core::schema::SchemaBuilder;
    use pulsedb_core::types::ColumnType;
    use pulsedb_core::Schema;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .add_column(ColumnType::Long, "e")
            .build()
            .unwrap()
    }

    fn record(schema: &Schema, ts_ns: i64, e: i64) -> Vec<u8> {
        let mut rec = vec![0u8; schema.record_size()];
        LittleEndian::write_i64(&mut rec[..8], ts_ns);
        let col = schema.column("e").unwrap();
        LittleEndian::write_i64(&mut rec[col.offset..col.offset + 8], e);
        rec
    }

    #[test]
    fn test_observe_only_matches() {
        let s = schema();
        let f = NamedFilter::new("hi_e", CompiledFilter::compile("e > 500", &s).unwrap());
        assert!(!f.observe(0, &record(&s, 1_000_000, 10), 1));
        assert!(f.observe(16, &record(&s, 1_000_000, 1000), 1));
        assert_eq!(f.num_matches(), 1);
        assert_eq!(f.offsets_in_range(i64::MIN, i64::MAX), vec![16]);
    }

    #[test]
    fn test_time_window_bounds() {
        let s = schema();
        let f = NamedFilter::new("all", CompiledFilter::compile("e >= 0", &s).unwrap());
        for (i, bucket) in [5i64, 7, 9].iter().enumerate() {
            let off = (i as u64) * 16;
            assert!(f.observe(off, &record(&s, bucket * 1_000_000, 1), *bucket));
        }
        assert_eq!(f.offsets_in_range(6, 8), vec![16]);
        assert_eq!(f.offsets_in_range(5, 9), vec![0, 16, 32]);
        assert_eq!(f.offsets_in_range(10, 20), Vec::<u64>::new());
        assert_eq!(f.offsets_in_range(9, 5), Vec::<u64>::new());
    }

    #[test]
    fn test_bucket_ordering_over_append_order() {
        // A late record lands in an earlier bucket; range queries order
        // by bucket first.
        let s = schema();
        let f = NamedFilter::new("all", CompiledFilter::compile("e >= 0", &s).unwrap());
        f.observe(0, &record(&s, 9_000_000, 1), 9);
        f.observe(16, &record(&s, 5_000_000, 1), 5);
        assert_eq!(f.offsets_in_range(0, 100), vec![16, 0]);
    }
}
