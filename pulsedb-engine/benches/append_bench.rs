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

//! Append-path benchmarks: bare log, indexed, and filtered appends.

use byteorder::{ByteOrder, LittleEndian};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pulsedb_core::schema::SchemaBuilder;
use pulsedb_core::types::ColumnType;
use pulsedb_core::Schema;
use pulsedb_engine::table::{StorageMode, Table};

fn bench_schema() -> Schema {
    SchemaBuilder::new()
        .add_column(ColumnType::Long, "value")
        .add_column(ColumnType::String(32), "tag")
        .build()
        .unwrap()
}

fn make_record(schema: &Schema, i: u64) -> Vec<u8> {
    let mut rec = vec![0u8; schema.record_size()];
    LittleEndian::write_i64(&mut rec[..8], (i / 100) as i64 * 1_000_000);
    let col = schema.column("value").unwrap();
    LittleEndian::write_i64(&mut rec[col.offset..col.offset + 8], i as i64);
    rec
}

fn bench_append(c: &mut Criterion) {
    let schema = bench_schema();
    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Elements(1));

    group.bench_function("bare", |b| {
        let table = Table::new("bench", 0, schema.clone(), StorageMode::InMemory);
        let mut i = 0u64;
        b.iter(|| {
            let rec = make_record(&schema, i);
            i += 1;
            black_box(table.append(&rec).unwrap());
        });
    });

    group.bench_function("indexed", |b| {
        let table = Table::new("bench", 0, schema.clone(), StorageMode::InMemory);
        table.add_index("value", 1.0).unwrap();
        let mut i = 0u64;
        b.iter(|| {
            let rec = make_record(&schema, i);
            i += 1;
            black_box(table.append(&rec).unwrap());
        });
    });

    group.bench_function("filtered_with_trigger", |b| {
        let table = Table::new("bench", 0, schema.clone(), StorageMode::InMemory);
        table.add_filter("hot", "value > 100").unwrap();
        table.add_trigger("surge", "hot", "COUNT() > 50").unwrap();
        let mut i = 0u64;
        b.iter(|| {
            let rec = make_record(&schema, i);
            i += 1;
            black_box(table.append(&rec).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_append);
criterion_main!(benches);
