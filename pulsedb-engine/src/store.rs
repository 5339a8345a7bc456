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

//! Table registry
//!
//! Process-wide mapping from table name and table id to live tables.
//! Ids are assigned monotonically from 0 and never reused. Sessions
//! receive `Arc<Table>` handles; removal tombstones the table so stale
//! handles fail on their next operation.

use crate::table::{StorageMode, Table};
use parking_lot::RwLock;
use pulsedb_core::{PulseError, Result, Schema};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Registry of live tables
#[derive(Default)]
pub struct Store {
    tables: RwLock<HashMap<String, Arc<Table>>>,
    /// Slot per assigned id; None once removed
    by_id: RwLock<Vec<Option<Arc<Table>>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table; fails if the name is taken
    pub fn add_table(&self, name: &str, schema: Schema, mode: StorageMode) -> Result<u64> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(PulseError::management(format!(
                "Table {} already exists",
                name
            )));
        }
        let mut by_id = self.by_id.write();
        let id = by_id.len() as u64;
        let table = Arc::new(Table::new(name, id, schema, mode));
        by_id.push(Some(table.clone()));
        tables.insert(name.to_string(), table);
        info!(table = name, id, "created table");
        Ok(id)
    }

    /// Stable handle to a table by name
    pub fn get_table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PulseError::management(format!("No such table {}", name)))
    }

    pub fn get_table_id(&self, name: &str) -> Result<u64> {
        Ok(self.get_table(name)?.id())
    }

    /// Remove a table by id. Returns the removed id, or -1 when the id
    /// was never assigned or the table is already gone.
    pub fn remove_table_by_id(&self, id: u64) -> i64 {
        let mut tables = self.tables.write();
        let mut by_id = self.by_id.write();
        let Some(slot) = by_id.get_mut(id as usize) else {
            return -1;
        };
        let Some(table) = slot.take() else {
            return -1;
        };
        tables.remove(table.name());
        table.mark_removed();
        info!(table = table.name(), id, "removed table");
        id as i64
    }

    /// Remove a table by name
    pub fn remove_table(&self, name: &str) -> Result<u64> {
        let mut tables = self.tables.write();
        let Some(table) = tables.remove(name) else {
            return Err(PulseError::management(format!("No such table {}", name)));
        };
        let mut by_id = self.by_id.write();
        by_id[table.id() as usize] = None;
        table.mark_removed();
        info!(table = name, id = table.id(), "removed table");
        Ok(table.id())
    }

    pub fn num_tables(&self) -> usize {
        self.tables.read().len()
    }
}
