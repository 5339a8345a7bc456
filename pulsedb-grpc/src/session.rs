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

//! Handler sessions and server-side cursors
//!
//! One session exists per registered handler. It owns the current-table
//! handle and four typed cursor maps, one per cursor kind, with a
//! monotonic per-session cursor id. Opening a cursor creates the
//! underlying stream, registers it, and returns the first page; the
//! client pulls the rest through `get_more`, which validates that the
//! descriptor's handler id matches this session.
//!
//! A cursor is garbage-collected by the `get_more` call that finds its
//! stream exhausted and returns an empty page; everything left drops
//! with the session on deregistration.

use crate::error::RpcError;
use pulsedb_engine::config::ITERATOR_BATCH_SIZE;
use pulsedb_engine::streams::{AlertStream, RecordStream};
use pulsedb_engine::table::Table;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Cursor kind: one map per kind inside the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Adhoc,
    Predef,
    Combined,
    Alerts,
}

/// Payload type carried by a cursor's pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Record,
    Alert,
}

/// Identifies a cursor across `get_more` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorDescriptor {
    pub payload: PayloadKind,
    pub handler_id: u64,
    pub id: u64,
    pub kind: CursorKind,
}

/// One page of cursor output
#[derive(Debug, Clone)]
pub struct Page {
    pub descriptor: CursorDescriptor,
    pub data: Vec<u8>,
    pub num_entries: u64,
    pub has_more: bool,
}

/// Per-handler session state
pub struct Session {
    handler_id: u64,
    table: Option<Arc<Table>>,
    next_cursor_id: u64,
    adhoc: HashMap<u64, RecordStream>,
    predef: HashMap<u64, RecordStream>,
    combined: HashMap<u64, RecordStream>,
    alerts: HashMap<u64, AlertStream>,
}

impl Session {
    pub fn new(handler_id: u64) -> Self {
        Self {
            handler_id,
            table: None,
            next_cursor_id: 0,
            adhoc: HashMap::new(),
            predef: HashMap::new(),
            combined: HashMap::new(),
            alerts: HashMap::new(),
        }
    }

    pub fn handler_id(&self) -> u64 {
        self.handler_id
    }

    /// Bind the session to a table handle
    pub fn set_table(&mut self, table: Arc<Table>) {
        self.table = Some(table);
    }

    pub fn table(&self) -> Result<&Arc<Table>, RpcError> {
        self.table
            .as_ref()
            .ok_or_else(|| RpcError::Management("No table selected".into()))
    }

    fn new_cursor_id(&mut self) -> u64 {
        let id = self.next_cursor_id;
        self.next_cursor_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Cursor open
    // ------------------------------------------------------------------

    /// Compile and run an ad-hoc filter; returns the first page
    pub fn adhoc_filter(&mut self, expression: &str) -> Result<Page, RpcError> {
        let stream = self
            .table()?
            .execute_filter(expression)
            .map_err(RpcError::query)?;
        let id = self.new_cursor_id();
        if self.adhoc.insert(id, stream).is_some() {
            return Err(RpcError::InvalidOperation("Duplicate iterator id".into()));
        }
        self.record_more(id, CursorKind::Adhoc)
    }

    /// Open a window over a named filter's matches; returns the first page
    pub fn predef_filter(
        &mut self,
        name: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<Page, RpcError> {
        let stream = self
            .table()?
            .query_filter(name, begin_ms, end_ms)
            .map_err(RpcError::query)?;
        let id = self.new_cursor_id();
        if self.predef.insert(id, stream).is_some() {
            return Err(RpcError::InvalidOperation("Duplicate iterator id".into()));
        }
        self.record_more(id, CursorKind::Predef)
    }

    /// Named-filter window narrowed by an ad-hoc expression
    pub fn combined_filter(
        &mut self,
        name: &str,
        expression: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<Page, RpcError> {
        let stream = self
            .table()?
            .query_filter_expr(name, expression, begin_ms, end_ms)
            .map_err(RpcError::query)?;
        let id = self.new_cursor_id();
        if self.combined.insert(id, stream).is_some() {
            return Err(RpcError::InvalidOperation("Duplicate iterator id".into()));
        }
        self.record_more(id, CursorKind::Combined)
    }

    /// Open a window over the table's alerts
    pub fn alerts_by_time(&mut self, begin_ms: i64, end_ms: i64) -> Result<Page, RpcError> {
        let alerts = self
            .table()?
            .get_alerts(begin_ms, end_ms)
            .map_err(RpcError::query)?;
        let id = self.new_cursor_id();
        if self.alerts.insert(id, AlertStream::new(alerts)).is_some() {
            return Err(RpcError::InvalidOperation("Duplicate iterator id".into()));
        }
        self.alerts_more(id)
    }

    // ------------------------------------------------------------------
    // Paginated fetch
    // ------------------------------------------------------------------

    /// Pull the next page of an open cursor. The descriptor must carry
    /// this session's handler id. The cursor is dropped once a call
    /// returns an empty exhausted page.
    pub fn get_more(&mut self, descriptor: CursorDescriptor) -> Result<Page, RpcError> {
        if descriptor.handler_id != self.handler_id {
            return Err(RpcError::InvalidOperation("handler_id mismatch".into()));
        }
        let page = match descriptor.kind {
            CursorKind::Adhoc => self.record_more(descriptor.id, CursorKind::Adhoc)?,
            CursorKind::Predef => self.record_more(descriptor.id, CursorKind::Predef)?,
            CursorKind::Combined => self.record_more(descriptor.id, CursorKind::Combined)?,
            CursorKind::Alerts => self.alerts_more(descriptor.id)?,
        };
        if page.num_entries == 0 && !page.has_more {
            match descriptor.kind {
                CursorKind::Adhoc => {
                    self.adhoc.remove(&descriptor.id);
                }
                CursorKind::Predef => {
                    self.predef.remove(&descriptor.id);
                }
                CursorKind::Combined => {
                    self.combined.remove(&descriptor.id);
                }
                CursorKind::Alerts => {
                    self.alerts.remove(&descriptor.id);
                }
            }
        }
        Ok(page)
    }

    fn record_more(&mut self, id: u64, kind: CursorKind) -> Result<Page, RpcError> {
        let record_size = self.table()?.record_size();
        let map = match kind {
            CursorKind::Adhoc => &mut self.adhoc,
            CursorKind::Predef => &mut self.predef,
            CursorKind::Combined => &mut self.combined,
            CursorKind::Alerts => unreachable!("alert cursors use alerts_more"),
        };
        let stream = map
            .get_mut(&id)
            .ok_or_else(|| RpcError::InvalidOperation("No such iterator".into()))?;

        let mut data = Vec::with_capacity(record_size * ITERATOR_BATCH_SIZE);
        let mut num_entries = 0u64;
        while num_entries < ITERATOR_BATCH_SIZE as u64 {
            let Some(view) = stream.next() else {
                break;
            };
            data.extend_from_slice(view.bytes());
            num_entries += 1;
        }
        Ok(Page {
            descriptor: CursorDescriptor {
                payload: PayloadKind::Record,
                handler_id: self.handler_id,
                id,
                kind,
            },
            data,
            num_entries,
            has_more: stream.has_more(),
        })
    }

    fn alerts_more(&mut self, id: u64) -> Result<Page, RpcError> {
        let stream = self
            .alerts
            .get_mut(&id)
            .ok_or_else(|| RpcError::InvalidOperation("No such iterator".into()))?;

        let mut data = String::new();
        let mut num_entries = 0u64;
        while num_entries < ITERATOR_BATCH_SIZE as u64 {
            let Some(alert) = stream.next() else {
                break;
            };
            let _ = writeln!(data, "{}", alert);
            num_entries += 1;
        }
        Ok(Page {
            descriptor: CursorDescriptor {
                payload: PayloadKind::Alert,
                handler_id: self.handler_id,
                id,
                kind: CursorKind::Alerts,
            },
            data: data.into_bytes(),
            num_entries,
            has_more: stream.has_more(),
        })
    }
}
