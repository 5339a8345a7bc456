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

//! Pull-based result streams
//!
//! Query results are single-pass streams with a `has_more`/`next`
//! contract, pulled one page at a time by the session layer. A stream
//! snapshots the log tail at creation; records appended afterwards are
//! not observed. Memory stays O(1) per stream plus the candidate
//! offset list for index-driven queries.

use crate::log::{RecordLog, RecordView};
use crate::trigger::Alert;
use pulsedb_core::CompiledFilter;
use std::sync::Arc;

/// Where a record stream draws candidate offsets from
enum OffsetSource {
    /// Dense scan of `[next, end)` in `step`-byte strides
    Scan { next: u64, end: u64, step: u64 },
    /// Precomputed candidate list (index lookups, filter time indexes)
    List(std::vec::IntoIter<u64>),
}

impl OffsetSource {
    fn next(&mut self) -> Option<u64> {
        match self {
            OffsetSource::Scan { next, end, step } => {
                if *next >= *end {
                    return None;
                }
                let off = *next;
                *next += *step;
                Some(off)
            }
            OffsetSource::List(iter) => iter.next(),
        }
    }
}

/// A single-pass stream of records
pub struct RecordStream {
    log: Arc<RecordLog>,
    source: OffsetSource,
    /// Re-check predicate for index candidates and combined queries
    predicate: Option<Arc<CompiledFilter>>,
    /// Tail snapshot taken at stream creation
    bound: u64,
    peeked: Option<RecordView>,
}

impl RecordStream {
    /// Full scan of every record at or below the current tail
    pub fn scan(log: Arc<RecordLog>, predicate: Option<Arc<CompiledFilter>>) -> Self {
        let bound = log.tail();
        let step = log.record_size() as u64;
        Self {
            log,
            source: OffsetSource::Scan {
                next: 0,
                end: bound,
                step,
            },
            predicate,
            bound,
            peeked: None,
        }
    }

    /// Stream over an explicit candidate offset list
    pub fn over_offsets(
        log: Arc<RecordLog>,
        offsets: Vec<u64>,
        predicate: Option<Arc<CompiledFilter>>,
    ) -> Self {
        let bound = log.tail();
        Self {
            log,
            source: OffsetSource::List(offsets.into_iter()),
            predicate,
            bound,
            peeked: None,
        }
    }

    fn fill(&mut self) {
        while self.peeked.is_none() {
            let Some(offset) = self.source.next() else {
                return;
            };
            // Candidates indexed after stream creation are out of scope.
            if offset + self.log.record_size() as u64 > self.bound {
                continue;
            }
            let Ok(view) = self.log.read_bounded(offset, self.bound) else {
                continue;
            };
            if let Some(pred) = &self.predicate {
                if !pred.matches(view.bytes()) {
                    continue;
                }
            }
            self.peeked = Some(view);
        }
    }

    /// True when `next` will yield a record
    pub fn has_more(&mut self) -> bool {
        self.fill();
        self.peeked.is_some()
    }

    /// Pull the next matching record
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<RecordView> {
        self.fill();
        self.peeked.take()
    }
}

/// A single-pass stream of alerts, snapshotted at creation
pub struct AlertStream {
    alerts: std::vec::IntoIter<Alert>,
    peeked: Option<Alert>,
}

impl AlertStream {
    pub fn new(alerts: Vec<Alert>) -> Self {
        Self {
            alerts: alerts.into_iter(),
            peeked: None,
        }
    }

    pub fn has_more(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.alerts.next();
        }
        self.peeked.is_some()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Alert> {
        if self.peeked.is_none() {
            self.peeked = self.alerts.next();
        }
        self.peeked.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};
    use pulsedb_core::schema::SchemaBuilder;
    use pulsedb_core::types::ColumnType;

    fn make_log_with_longs(values: &[i64]) -> (Arc<RecordLog>, pulsedb_core::Schema) {
        let schema = SchemaBuilder::new()
            .add_column(ColumnType::Long, "e")
            .build()
            .unwrap();
        let log = Arc::new(RecordLog::new(schema.record_size()));
        for &v in values {
            let mut rec = vec![0u8; schema.record_size()];
            let col = schema.column("e").unwrap();
            LittleEndian::write_i64(&mut rec[col.offset..col.offset + 8], v);
            log.append(&rec);
        }
        (log, schema)
    }

    #[test]
    fn test_scan_yields_all_in_order() {
        let (log, _) = make_log_with_longs(&[1, 2, 3]);
        let mut stream = RecordStream::scan(log, None);
        let mut offsets = Vec::new();
        while let Some(view) = stream.next() {
            offsets.push(view.offset());
        }
        assert_eq!(offsets, vec![0, 16, 32]);
    }

    #[test]
    fn test_scan_with_predicate() {
        let (log, schema) = make_log_with_longs(&[1, 100, 2, 200]);
        let pred = Arc::new(CompiledFilter::compile("e > 50", &schema).unwrap());
        let mut stream = RecordStream::scan(log, Some(pred));
        let mut offsets = Vec::new();
        while stream.has_more() {
            offsets.push(stream.next().unwrap().offset());
        }
        assert_eq!(offsets, vec![16, 48]);
    }

    #[test]
    fn test_snapshot_excludes_later_appends() {
        let (log, _) = make_log_with_longs(&[1, 2]);
        let mut stream = RecordStream::scan(log.clone(), None);
        log.append(&[0u8; 16]);
        let mut n = 0;
        while stream.next().is_some() {
            n += 1;
        }
        assert_eq!(n, 2);
    }

    #[test]
    fn test_offset_list_stream() {
        let (log, _) = make_log_with_longs(&[1, 2, 3, 4]);
        let mut stream = RecordStream::over_offsets(log, vec![48, 16], None);
        assert_eq!(stream.next().unwrap().offset(), 48);
        assert_eq!(stream.next().unwrap().offset(), 16);
        assert!(!stream.has_more());
    }

    #[test]
    fn test_has_more_idempotent() {
        let (log, _) = make_log_with_longs(&[1]);
        let mut stream = RecordStream::scan(log, None);
        assert!(stream.has_more());
        assert!(stream.has_more());
        stream.next().unwrap();
        assert!(!stream.has_more());
    }
}
