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

//! Per-column bucketed inverted index
//!
//! Each index maps a bucket key to an insertion-ordered posting list of
//! record offsets. Numeric columns bucket by
//! `floor(value * (1.0 / bucket_size))` in double precision; STRING
//! columns key on the raw fixed-width bytes and ignore the bucket size.
//! Buckets are created lazily on first insertion.

use parking_lot::RwLock;
use pulsedb_core::schema::Column;
use pulsedb_core::types::{ColumnType, Value};
use std::collections::BTreeMap;

/// Bucket key: numeric buckets order before raw-byte string keys
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketKey {
    Num(i64),
    Str(Vec<u8>),
}

/// Inverted index over one column
pub struct ColumnIndex {
    column: Column,
    bucket_size: f64,
    buckets: RwLock<BTreeMap<BucketKey, Vec<u64>>>,
}

impl ColumnIndex {
    pub fn new(column: Column, bucket_size: f64) -> Self {
        Self {
            column,
            bucket_size,
            buckets: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn bucket_size(&self) -> f64 {
        self.bucket_size
    }

    /// Bucket key for a decoded value of this index's column
    pub fn bucket_key(&self, value: &Value) -> BucketKey {
        match value {
            Value::Str(bytes) => BucketKey::Str(bytes.clone()),
            Value::Bool(b) => BucketKey::Num(*b as i64),
            v => {
                // Schema guarantees a numeric value here.
                let num = v.as_f64().unwrap_or(0.0);
                BucketKey::Num((num * (1.0 / self.bucket_size)).floor() as i64)
            }
        }
    }

    /// Bucket key for the raw literal of a comparison against this column
    pub fn key_for_f64(&self, value: f64) -> i64 {
        (value * (1.0 / self.bucket_size)).floor() as i64
    }

    /// Record `offset` under the bucket of the column value in `record`
    pub fn insert(&self, offset: u64, record: &[u8]) {
        let key = self.bucket_key(&self.column.value(record));
        self.buckets.write().entry(key).or_default().push(offset);
    }

    /// Offsets in the bucket of `key`, in insertion order
    pub fn lookup(&self, key: &BucketKey) -> Vec<u64> {
        self.buckets
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Offsets whose bucket keys fall in `[low, high]`, ascending by
    /// bucket then insertion order within each bucket
    pub fn scan(&self, low: &BucketKey, high: &BucketKey) -> Vec<u64> {
        let buckets = self.buckets.read();
        let mut out = Vec::new();
        for (_, offsets) in buckets.range(low.clone()..=high.clone()) {
            out.extend_from_slice(offsets);
        }
        out
    }

    /// All offsets in the index, ascending by bucket
    pub fn scan_all(&self) -> Vec<u64> {
        let buckets = self.buckets.read();
        let mut out = Vec::new();
        for offsets in buckets.values() {
            out.extend_from_slice(offsets);
        }
        out
    }

    /// Total number of indexed offsets across all buckets
    pub fn len(&self) -> u64 {
        self.buckets.read().values().map(|v| v.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }
}

/// True when this column type can be indexed with the given bucket size
pub fn valid_bucket_size(ty: &ColumnType, bucket_size: f64) -> bool {
    match ty {
        ColumnType::String(_) => true, // bucket size ignored
        _ => bucket_size > 0.0 && bucket_size.is_finite(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};
    use pulsedb_core::schema::SchemaBuilder;
    use pulsedb_core::types::ColumnType;

    fn long_column() -> Column {
        let schema = SchemaBuilder::new()
            .add_column(ColumnType::Long, "e")
            .build()
            .unwrap();
        schema.column("e").unwrap().clone()
    }

    fn record_with_long(col: &Column, v: i64) -> Vec<u8> {
        let mut rec = vec![0u8; col.offset + 8];
        LittleEndian::write_i64(&mut rec[col.offset..], v);
        rec
    }

    #[test]
    fn test_unit_bucket_exact_keys() {
        let col = long_column();
        let idx = ColumnIndex::new(col.clone(), 1.0);
        for (off, v) in [(0u64, 10i64), (8, 11), (16, 10)] {
            idx.insert(off, &record_with_long(&col, v));
        }
        assert_eq!(idx.lookup(&BucketKey::Num(10)), vec![0, 16]);
        assert_eq!(idx.lookup(&BucketKey::Num(11)), vec![8]);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn test_coarse_bucket() {
        let col = long_column();
        let idx = ColumnIndex::new(col.clone(), 100.0);
        idx.insert(0, &record_with_long(&col, 5));
        idx.insert(8, &record_with_long(&col, 99));
        idx.insert(16, &record_with_long(&col, 100));
        assert_eq!(idx.lookup(&BucketKey::Num(0)), vec![0, 8]);
        assert_eq!(idx.lookup(&BucketKey::Num(1)), vec![16]);
    }

    #[test]
    fn test_negative_values_floor() {
        let col = long_column();
        let idx = ColumnIndex::new(col.clone(), 10.0);
        idx.insert(0, &record_with_long(&col, -5));
        // floor(-0.5) == -1
        assert_eq!(idx.lookup(&BucketKey::Num(-1)), vec![0]);
    }

    #[test]
    fn test_scan_range_ordering() {
        let col = long_column();
        let idx = ColumnIndex::new(col.clone(), 1.0);
        idx.insert(0, &record_with_long(&col, 3));
        idx.insert(8, &record_with_long(&col, 1));
        idx.insert(16, &record_with_long(&col, 2));
        idx.insert(24, &record_with_long(&col, 1));
        assert_eq!(
            idx.scan(&BucketKey::Num(1), &BucketKey::Num(2)),
            vec![8, 24, 16]
        );
        assert_eq!(idx.scan_all(), vec![8, 24, 16, 0]);
    }

    #[test]
    fn test_string_raw_key() {
        let schema = SchemaBuilder::new()
            .add_column(ColumnType::String(4), "h")
            .build()
            .unwrap();
        let col = schema.column("h").unwrap().clone();
        let idx = ColumnIndex::new(col.clone(), 1.0);
        let mut rec = vec![0u8; schema.record_size()];
        rec[col.offset..col.offset + 4].copy_from_slice(b"ab\0\0");
        idx.insert(0, &rec);
        assert_eq!(idx.lookup(&BucketKey::Str(b"ab\0\0".to_vec())), vec![0]);
        assert!(idx.lookup(&BucketKey::Str(b"ab".to_vec())).is_empty());
    }
}
