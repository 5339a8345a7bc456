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

//! Log tables
//!
//! A table composes the record log, per-column indexes, named filters,
//! triggers, and the alert store. The append path fans out under a
//! single short append lock: log append, index maintenance, filter
//! evaluation, trigger aggregation, and bucket-close alert emission
//! all observe the record before the next append starts.
//!
//! Sessions hold `Arc<Table>` handles; removing a table from the store
//! sets a tombstone flag that fails subsequent operations on stale
//! handles without invalidating their memory.

use crate::filter::NamedFilter;
use crate::index::{valid_bucket_size, BucketKey, ColumnIndex};
use crate::log::{RecordLog, RecordView};
use crate::streams::RecordStream;
use crate::trigger::{Alert, AlertLog, Trigger};
use parking_lot::{Mutex, RwLock};
use pulsedb_core::expr::CmpOp;
use pulsedb_core::types::ColumnType;
use pulsedb_core::{
    CompiledFilter, Literal, PulseError, RecordBatch, Result, Schema, TriggerExpr,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Storage mode selector. Only the in-memory arena is implemented;
/// durable modes keep the same offset semantics and currently share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    InMemory,
    DurableRelaxed,
    Durable,
}

impl StorageMode {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(StorageMode::InMemory),
            1 => Some(StorageMode::DurableRelaxed),
            2 => Some(StorageMode::Durable),
            _ => None,
        }
    }
}

/// An append-only, schema-typed log table
pub struct Table {
    name: String,
    id: u64,
    schema: Schema,
    mode: StorageMode,
    log: Arc<RecordLog>,
    indexes: RwLock<HashMap<String, Arc<ColumnIndex>>>,
    filters: RwLock<HashMap<String, Arc<NamedFilter>>>,
    triggers: RwLock<HashMap<String, Arc<Trigger>>>,
    alerts: AlertLog,
    append_lock: Mutex<()>,
    removed: AtomicBool,
}

impl Table {
    pub fn new(name: impl Into<String>, id: u64, schema: Schema, mode: StorageMode) -> Self {
        let record_size = schema.record_size();
        Self {
            name: name.into(),
            id,
            schema,
            mode,
            log: Arc::new(RecordLog::new(record_size)),
            indexes: RwLock::new(HashMap::new()),
            filters: RwLock::new(HashMap::new()),
            triggers: RwLock::new(HashMap::new()),
            alerts: AlertLog::new(),
            append_lock: Mutex::new(()),
            removed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn record_size(&self) -> usize {
        self.schema.record_size()
    }

    pub fn num_records(&self) -> u64 {
        self.log.num_records()
    }

    /// Flag the table as removed; outstanding handles fail from now on
    pub(crate) fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }

    fn check_alive(&self) -> Result<()> {
        if self.removed.load(Ordering::Acquire) {
            Err(PulseError::management(format!(
                "Table {} has been removed",
                self.name
            )))
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Append path
    // ------------------------------------------------------------------

    /// Append one record, returning its offset
    pub fn append(&self, record: &[u8]) -> Result<u64> {
        self.check_alive()?;
        self.validate_record(record)?;
        let _guard = self.append_lock.lock();
        Ok(self.append_locked(record))
    }

    /// Append a batch; all records receive consecutive offsets and the
    /// offset of the first is returned
    pub fn append_batch(&self, batch: &RecordBatch) -> Result<u64> {
        self.check_alive()?;
        if batch.is_empty() {
            return Err(PulseError::invalid_operation("Empty record batch"));
        }
        for record in batch.records() {
            self.validate_record(record)?;
        }
        let _guard = self.append_lock.lock();
        let mut first = None;
        for record in batch.records() {
            let offset = self.append_locked(record);
            first.get_or_insert(offset);
        }
        Ok(first.unwrap_or(0))
    }

    fn validate_record(&self, record: &[u8]) -> Result<()> {
        if record.len() != self.record_size() {
            return Err(PulseError::invalid_operation(format!(
                "Record size mismatch: expected {}, got {}",
                self.record_size(),
                record.len()
            )));
        }
        Ok(())
    }

    /// Core append fan-out; caller holds the append lock
    fn append_locked(&self, record: &[u8]) -> u64 {
        let offset = self.log.append(record);
        let bucket_ms = self.schema.time_bucket_ms(record);

        for index in self.indexes.read().values() {
            index.insert(offset, record);
        }

        // Lock order: filters before triggers, everywhere.
        let filters = self.filters.read();
        let triggers = self.triggers.read();
        for filter in filters.values() {
            if filter.observe(offset, record, bucket_ms) {
                for trigger in triggers.values() {
                    if trigger.filter_name() == filter.name() {
                        trigger.record_match(record, bucket_ms);
                    }
                }
            }
        }
        for trigger in triggers.values() {
            for alert in trigger.advance(bucket_ms) {
                self.alerts.push(alert);
            }
        }

        offset
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Read the record at `offset`
    pub fn read(&self, offset: u64) -> Result<RecordView> {
        self.check_alive()?;
        self.log.read(offset)
    }

    /// Read `nrecords` consecutive records; fails past the tail
    pub fn read_range(&self, offset: u64, nrecords: u64) -> Result<Vec<u8>> {
        self.check_alive()?;
        self.log.read_range(offset, nrecords)
    }

    // ------------------------------------------------------------------
    // Index management
    // ------------------------------------------------------------------

    /// Index `field_name` with the given bucket size. Existing records
    /// are back-filled before the index becomes visible to queries;
    /// appends are held off for the duration.
    pub fn add_index(&self, field_name: &str, bucket_size: f64) -> Result<()> {
        self.check_alive()?;
        let column = self
            .schema
            .column(field_name)
            .ok_or_else(|| PulseError::management(format!("No such column {}", field_name)))?
            .clone();
        if !valid_bucket_size(&column.ty, bucket_size) {
            return Err(PulseError::management(format!(
                "Invalid bucket size {} for column {}",
                bucket_size, field_name
            )));
        }
        // Exclusive with appends: the tail cannot move during back-fill.
        let _guard = self.append_lock.lock();
        if self.indexes.read().contains_key(field_name) {
            return Err(PulseError::management(format!(
                "Column {} is already indexed",
                field_name
            )));
        }
        let index = Arc::new(ColumnIndex::new(column, bucket_size));
        let tail = self.log.tail();
        let step = self.record_size() as u64;
        let mut offset = 0;
        while offset < tail {
            let view = self.log.read_bounded(offset, tail)?;
            index.insert(offset, view.bytes());
            offset += step;
        }
        self.indexes.write().insert(field_name.to_string(), index);
        tracing::debug!(table = %self.name, column = field_name, "index built");
        Ok(())
    }

    pub fn remove_index(&self, field_name: &str) -> Result<()> {
        self.check_alive()?;
        let _guard = self.append_lock.lock();
        self.indexes
            .write()
            .remove(field_name)
            .map(|_| ())
            .ok_or_else(|| PulseError::management(format!("No index on column {}", field_name)))
    }

    // ------------------------------------------------------------------
    // Filter management
    // ------------------------------------------------------------------

    /// Register a named filter; it observes appends from now on
    pub fn add_filter(&self, name: &str, expr: &str) -> Result<()> {
        self.check_alive()?;
        let compiled = CompiledFilter::compile(expr, &self.schema)?;
        let mut filters = self.filters.write();
        if filters.contains_key(name) {
            return Err(PulseError::management(format!(
                "Filter {} already exists",
                name
            )));
        }
        filters.insert(name.to_string(), Arc::new(NamedFilter::new(name, compiled)));
        Ok(())
    }

    pub fn remove_filter(&self, name: &str) -> Result<()> {
        self.check_alive()?;
        // Triggers bound to the filter die with it.
        let mut filters = self.filters.write();
        filters
            .remove(name)
            .ok_or_else(|| PulseError::management(format!("No such filter {}", name)))?;
        self.triggers
            .write()
            .retain(|_, t| t.filter_name() != name);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Trigger management
    // ------------------------------------------------------------------

    pub fn add_trigger(&self, name: &str, filter_name: &str, expr: &str) -> Result<()> {
        self.check_alive()?;
        if !self.filters.read().contains_key(filter_name) {
            return Err(PulseError::management(format!(
                "No such filter {}",
                filter_name
            )));
        }
        let compiled = TriggerExpr::compile(expr, &self.schema)?;
        let mut triggers = self.triggers.write();
        if triggers.contains_key(name) {
            return Err(PulseError::management(format!(
                "Trigger {} already exists",
                name
            )));
        }
        triggers.insert(
            name.to_string(),
            Arc::new(Trigger::new(name, filter_name, compiled)),
        );
        Ok(())
    }

    pub fn remove_trigger(&self, name: &str) -> Result<()> {
        self.check_alive()?;
        self.triggers
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PulseError::management(format!("No such trigger {}", name)))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Ad-hoc filter over all records at or below the current tail.
    /// When a top-level conjunct compares an indexed column, candidates
    /// come from that index and the full predicate is re-checked;
    /// otherwise this is a full scan.
    pub fn execute_filter(&self, expr: &str) -> Result<RecordStream> {
        self.check_alive()?;
        let compiled = Arc::new(CompiledFilter::compile(expr, &self.schema)?);
        let indexes = self.indexes.read();
        for cmp in compiled.conjuncts() {
            let Some(index) = indexes.get(&cmp.column.name) else {
                continue;
            };
            if let Some(candidates) = index_candidates(index, cmp.op, &cmp.literal, &cmp.column.ty)
            {
                return Ok(RecordStream::over_offsets(
                    self.log.clone(),
                    candidates,
                    Some(compiled.clone()),
                ));
            }
        }
        Ok(RecordStream::scan(self.log.clone(), Some(compiled)))
    }

    /// Stream the matches of a named filter inside `[begin_ms, end_ms]`
    pub fn query_filter(&self, name: &str, begin_ms: i64, end_ms: i64) -> Result<RecordStream> {
        self.check_alive()?;
        let filter = self.get_filter(name)?;
        let offsets = filter.offsets_in_range(begin_ms, end_ms);
        Ok(RecordStream::over_offsets(self.log.clone(), offsets, None))
    }

    /// Named-filter matches inside the window, narrowed by an ad-hoc
    /// expression
    pub fn query_filter_expr(
        &self,
        name: &str,
        expr: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<RecordStream> {
        self.check_alive()?;
        let filter = self.get_filter(name)?;
        let compiled = Arc::new(CompiledFilter::compile(expr, &self.schema)?);
        let offsets = filter.offsets_in_range(begin_ms, end_ms);
        Ok(RecordStream::over_offsets(
            self.log.clone(),
            offsets,
            Some(compiled),
        ))
    }

    fn get_filter(&self, name: &str) -> Result<Arc<NamedFilter>> {
        self.filters
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PulseError::invalid_operation(format!("No such filter {}", name)))
    }

    /// Alerts whose bucket lies in `[begin_ms, end_ms]`
    pub fn get_alerts(&self, begin_ms: i64, end_ms: i64) -> Result<Vec<Alert>> {
        self.check_alive()?;
        Ok(self.alerts.range(begin_ms, end_ms))
    }
}

/// Candidate offsets for one comparison against an indexed column.
/// Returns None when the operator cannot be served by the index
/// (inequality, or range operators on string columns).
fn index_candidates(
    index: &ColumnIndex,
    op: CmpOp,
    literal: &Literal,
    ty: &ColumnType,
) -> Option<Vec<u64>> {
    match ty {
        ColumnType::String(n) => {
            if op != CmpOp::Eq {
                return None;
            }
            let s = match literal {
                Literal::Str(s) => s,
                _ => return None,
            };
            // Key on the zero-padded fixed-width bytes.
            let mut key = s.as_bytes().to_vec();
            key.resize(*n, 0);
            Some(index.lookup(&BucketKey::Str(key)))
        }
        _ => {
            let value = literal.as_f64()?;
            let key = index.key_for_f64(value);
            let offsets = match op {
                CmpOp::Eq => index.lookup(&BucketKey::Num(key)),
                // The bucket containing the literal may hold values on
                // both sides of it, so range scans include it and rely
                // on the predicate re-check.
                CmpOp::Gt | CmpOp::Ge => {
                    index.scan(&BucketKey::Num(key), &BucketKey::Num(i64::MAX))
                }
                CmpOp::Lt | CmpOp::Le => {
                    index.scan(&BucketKey::Num(i64::MIN), &BucketKey::Num(key))
                }
                CmpOp::Ne => return None,
            };
            Some(offsets)
        }
    }
}
