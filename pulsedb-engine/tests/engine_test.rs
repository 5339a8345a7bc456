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

//! End-to-end engine tests: store lifecycle, append/read, filters,
//! indexes, and trigger-driven alerts.

use byteorder::{ByteOrder, LittleEndian};
use pulsedb_core::schema::SchemaBuilder;
use pulsedb_core::types::{ColumnType, Value};
use pulsedb_core::Schema;
use pulsedb_engine::store::Store;
use pulsedb_engine::table::{StorageMode, Table};

const MAX_RECORDS: u64 = 2560;
const DATA_SIZE: usize = 64;

/// The eight-column telemetry schema used across these tests
fn full_schema() -> Schema {
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

#[allow(clippy::too_many_arguments)]
fn make_record(
    schema: &Schema,
    ts_ns: i64,
    a: bool,
    b: char,
    c: i16,
    d: i32,
    e: i64,
    f: f32,
    g: f64,
    h: &str,
) -> Vec<u8> {
    let mut rec = vec![0u8; schema.record_size()];
    LittleEndian::write_i64(&mut rec[..8], ts_ns);
    let set = |rec: &mut Vec<u8>, name: &str, value: Value| {
        let col = schema.column(name).unwrap();
        let width = col.width();
        assert!(col.ty.encode(&value, &mut rec[col.offset..col.offset + width]));
    };
    set(&mut rec, "a", Value::Bool(a));
    set(&mut rec, "b", Value::Char(b as u8));
    set(&mut rec, "c", Value::Short(c));
    set(&mut rec, "d", Value::Int(d));
    set(&mut rec, "e", Value::Long(e));
    set(&mut rec, "f", Value::Float(f));
    set(&mut rec, "g", Value::Double(g));
    set(&mut rec, "h", Value::Str(h.as_bytes().to_vec()));
    rec
}

/// Appends the canonical eight records with e = 0,1,10,...,1000000 and
/// b = '0'..'7', all inside millisecond bucket `base_ms`.
fn append_eight(table: &Table, base_ms: i64) -> Vec<u64> {
    let schema = table.schema().clone();
    let ts = base_ms * 1_000_000;
    let values: [(bool, char, i16, i32, i64, f32, f64, &str); 8] = [
        (false, '0', 0, 0, 0, 0.0, 0.01, "abc"),
        (true, '1', 10, 2, 1, 0.1, 0.02, "defg"),
        (false, '2', 20, 4, 10, 0.2, 0.03, "hijkl"),
        (true, '3', 30, 6, 100, 0.3, 0.04, "mnopqr"),
        (false, '4', 40, 8, 1000, 0.4, 0.05, "stuvwx"),
        (true, '5', 50, 10, 10000, 0.5, 0.06, "yyy"),
        (false, '6', 60, 12, 100000, 0.6, 0.07, "zzz"),
        (true, '7', 70, 14, 1000000, 0.7, 0.08, "zzz"),
    ];
    values
        .iter()
        .map(|&(a, b, c, d, e, f, g, h)| {
            let rec = make_record(&schema, ts, a, b, c, d, e, f, g, h);
            table.append(&rec).unwrap()
        })
        .collect()
}

#[test]
fn test_add_and_remove_table() {
    let store = Store::new();
    let id = store
        .add_table("my_table", full_schema(), StorageMode::InMemory)
        .unwrap();
    assert_eq!(store.get_table_id("my_table").unwrap(), id);

    assert_ne!(store.remove_table_by_id(id), -1);
    let err = store.remove_table("my_table").unwrap_err();
    assert_eq!(err.to_string(), "No such table my_table");
}

#[test]
fn test_append_and_get() {
    let schema = SchemaBuilder::new()
        .add_column(ColumnType::String(DATA_SIZE - 8), "data")
        .build()
        .unwrap();
    assert_eq!(schema.record_size(), DATA_SIZE);
    let table = Table::new("t", 0, schema, StorageMode::InMemory);

    let mut offsets = Vec::new();
    for i in 0..MAX_RECORDS {
        let rec = vec![(i % 256) as u8; DATA_SIZE];
        offsets.push(table.append(&rec).unwrap());
    }
    assert_eq!(table.num_records(), MAX_RECORDS);

    for (i, &offset) in offsets.iter().enumerate() {
        let view = table.read(offset).unwrap();
        let expected = (i % 256) as u8;
        assert_eq!(view.bytes().len(), DATA_SIZE);
        assert!(view.bytes().iter().all(|&byte| byte == expected));
    }
}

#[test]
fn test_offset_monotonicity() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    let offsets = append_eight(&table, 100);
    let step = table.record_size() as u64;
    for pair in offsets.windows(2) {
        assert_eq!(pair[1], pair[0] + step);
    }
}

#[test]
fn test_filter_roundtrip() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_filter("hi_e", "e > 500").unwrap();
    let offsets = append_eight(&table, 100);

    let mut stream = table.query_filter("hi_e", 0, i64::MAX).unwrap();
    let col_e = table.schema().column("e").unwrap().clone();
    let mut seen = Vec::new();
    while let Some(view) = stream.next() {
        seen.push((view.offset(), col_e.value(view.bytes())));
    }
    let expected: Vec<(u64, Value)> = [(4usize, 1000i64), (5, 10000), (6, 100000), (7, 1000000)]
        .iter()
        .map(|&(i, e)| (offsets[i], Value::Long(e)))
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_filter_window_excludes_other_buckets() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_filter("all", "e >= 0").unwrap();
    append_eight(&table, 100);
    append_eight(&table, 200);

    let mut stream = table.query_filter("all", 100, 100).unwrap();
    let mut count = 0;
    while stream.next().is_some() {
        count += 1;
    }
    assert_eq!(count, 8);
}

#[test]
fn test_index_scan() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    append_eight(&table, 100);
    table.add_index("e", 1.0).unwrap();

    let mut stream = table.execute_filter("e == 10000").unwrap();
    let view = stream.next().unwrap();
    let col_e = table.schema().column("e").unwrap();
    assert_eq!(col_e.value(view.bytes()), Value::Long(10000));
    assert!(!stream.has_more());
}

#[test]
fn test_index_backfill_matches_scan() {
    // Index added after half the data exists; results must still cover
    // everything at query time.
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    append_eight(&table, 100);
    table.add_index("e", 1.0).unwrap();
    append_eight(&table, 200);

    let mut stream = table.execute_filter("e == 1000").unwrap();
    let mut count = 0;
    while stream.next().is_some() {
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn test_string_index_lookup() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_index("h", 1.0).unwrap();
    append_eight(&table, 100);

    let mut stream = table.execute_filter("h == \"zzz\"").unwrap();
    let mut count = 0;
    while stream.next().is_some() {
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn test_combined_filter() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_filter("hi_e", "e > 500").unwrap();
    append_eight(&table, 100);
    append_eight(&table, 200);

    // Window restricted to bucket 100, narrowed to b == '5'.
    let mut stream = table
        .query_filter_expr("hi_e", "b == \"5\"", 100, 100)
        .unwrap();
    let view = stream.next().unwrap();
    let col_b = table.schema().column("b").unwrap();
    assert_eq!(col_b.value(view.bytes()), Value::Char(b'5'));
    assert!(!stream.has_more());
}

#[test]
fn test_trigger_alert() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_filter("all_true", "a == true").unwrap();
    table
        .add_trigger("many_true", "all_true", "COUNT() > 2")
        .unwrap();

    let schema = table.schema().clone();
    let bucket = 500i64;
    for _ in 0..3 {
        let rec = make_record(
            &schema,
            bucket * 1_000_000,
            true,
            'x',
            0,
            0,
            1,
            0.0,
            0.0,
            "r",
        );
        table.append(&rec).unwrap();
    }
    // No alert while the bucket is open.
    assert!(table.get_alerts(bucket, bucket).unwrap().is_empty());

    // One record in the next bucket closes it.
    let rec = make_record(
        &schema,
        (bucket + 1) * 1_000_000,
        false,
        'x',
        0,
        0,
        1,
        0.0,
        0.0,
        "r",
    );
    table.append(&rec).unwrap();

    let alerts = table.get_alerts(bucket, bucket).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].trigger_name, "many_true");
    assert_eq!(alerts[0].bucket_ms, bucket);
    assert_eq!(alerts[0].value, 3.0);
    assert_eq!(
        alerts[0].to_string(),
        format!("many_true|{}|3|COUNT() > 2", bucket)
    );
}

#[test]
fn test_trigger_fires_once_per_bucket() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_filter("all_true", "a == true").unwrap();
    table
        .add_trigger("many_true", "all_true", "COUNT() > 2")
        .unwrap();

    let schema = table.schema().clone();
    for bucket in [500i64, 501, 502] {
        for _ in 0..3 {
            let rec = make_record(
                &schema,
                bucket * 1_000_000,
                true,
                'x',
                0,
                0,
                1,
                0.0,
                0.0,
                "r",
            );
            table.append(&rec).unwrap();
        }
    }
    // Buckets 500 and 501 are closed; 502 is still open.
    let alerts = table.get_alerts(0, i64::MAX).unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].bucket_ms, 500);
    assert_eq!(alerts[1].bucket_ms, 501);
}

#[test]
fn test_adhoc_stream_snapshot_isolation() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    append_eight(&table, 100);
    let mut stream = table.execute_filter("e >= 0").unwrap();
    append_eight(&table, 200);

    let mut count = 0;
    while stream.next().is_some() {
        count += 1;
    }
    assert_eq!(count, 8);
}

#[test]
fn test_read_range_and_bounds() {
    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    let offsets = append_eight(&table, 100);
    let step = table.record_size() as u64;

    let bytes = table.read_range(offsets[2], 3).unwrap();
    assert_eq!(bytes.len(), 3 * step as usize);
    assert_eq!(&bytes[..step as usize], table.read(offsets[2]).unwrap().bytes());

    assert!(table.read_range(offsets[7], 2).is_err());
    assert!(table.read_range(8 * step, 1).is_err());
}

#[test]
fn test_index_completeness_random() {
    // Every indexed offset lands in exactly the bucket of its value,
    // with no gaps and no duplicates, for a random append sequence.
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);

    let table = Table::new("t", 0, full_schema(), StorageMode::InMemory);
    table.add_index("e", 10.0).unwrap();

    let schema = table.schema().clone();
    let mut expected: std::collections::BTreeMap<i64, Vec<u64>> = Default::default();
    for _ in 0..512 {
        let e: i64 = rng.gen_range(-1000..1000);
        let rec = make_record(&schema, 1_000_000, false, 'x', 0, 0, e, 0.0, 0.0, "r");
        let offset = table.append(&rec).unwrap();
        let bucket = (e as f64 * (1.0 / 10.0)).floor() as i64;
        expected.entry(bucket).or_default().push(offset);
    }

    for (&bucket, offsets) in &expected {
        let low = bucket * 10;
        let high = bucket * 10 + 9;
        let mut stream = table
            .execute_filter(&format!("e >= {} && e <= {}", low, high))
            .unwrap();
        let mut got = Vec::new();
        while let Some(view) = stream.next() {
            got.push(view.offset());
        }
        assert_eq!(&got, offsets, "bucket {}", bucket);
    }
}
