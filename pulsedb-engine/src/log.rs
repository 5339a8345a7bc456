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

//! Append-only record arena
//!
//! The log is a growable sequence of fixed-size blocks, each holding a
//! whole number of records, so a record never straddles a block
//! boundary. A record's offset is its byte position in the log and is
//! stable for the process lifetime.
//!
//! ## Concurrency
//!
//! Writers serialize on a short append mutex; the tail offset is
//! published with release ordering only after the record bytes are in
//! place. Readers snapshot the tail with acquire ordering and never
//! take the append lock, so any offset at or below an observed tail
//! reads complete record bytes.

use crate::config::BLOCK_RECORDS;
use parking_lot::{Mutex, RwLock};
use pulsedb_core::{PulseError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One arena block: preallocated so appends never reallocate
type Block = Arc<RwLock<Vec<u8>>>;

/// Append-only arena of fixed-size records
pub struct RecordLog {
    record_size: usize,
    block_bytes: usize,
    blocks: RwLock<Vec<Block>>,
    /// Bytes published to readers
    tail: AtomicU64,
    append_lock: Mutex<()>,
}

impl RecordLog {
    pub fn new(record_size: usize) -> Self {
        assert!(record_size > 0);
        Self {
            record_size,
            block_bytes: record_size * BLOCK_RECORDS,
            blocks: RwLock::new(Vec::new()),
            tail: AtomicU64::new(0),
            append_lock: Mutex::new(()),
        }
    }

    /// Fixed record size in bytes
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Currently published tail offset
    pub fn tail(&self) -> u64 {
        self.tail.load(Ordering::Acquire)
    }

    /// Number of published records
    pub fn num_records(&self) -> u64 {
        self.tail() / self.record_size as u64
    }

    /// Append one record, returning its offset.
    ///
    /// `record` must be exactly `record_size` bytes; the caller
    /// validates this against the schema.
    pub fn append(&self, record: &[u8]) -> u64 {
        debug_assert_eq!(record.len(), self.record_size);
        let _guard = self.append_lock.lock();
        let offset = self.tail.load(Ordering::Relaxed);
        let block = self.block_for_append(offset);
        block.write().extend_from_slice(record);
        self.tail
            .store(offset + self.record_size as u64, Ordering::Release);
        offset
    }

    fn block_for_append(&self, offset: u64) -> Block {
        let block_idx = (offset / self.block_bytes as u64) as usize;
        {
            let blocks = self.blocks.read();
            if block_idx < blocks.len() {
                return blocks[block_idx].clone();
            }
        }
        let mut blocks = self.blocks.write();
        if block_idx >= blocks.len() {
            blocks.push(Arc::new(RwLock::new(Vec::with_capacity(self.block_bytes))));
        }
        blocks[block_idx].clone()
    }

    /// Read one record at `offset` against the current tail snapshot
    pub fn read(&self, offset: u64) -> Result<RecordView> {
        self.read_bounded(offset, self.tail())
    }

    /// Read one record at `offset`, requiring `offset + record_size <= bound`
    pub fn read_bounded(&self, offset: u64, bound: u64) -> Result<RecordView> {
        if offset % self.record_size as u64 != 0 {
            return Err(PulseError::invalid_operation(format!(
                "Unaligned offset {}",
                offset
            )));
        }
        if offset + self.record_size as u64 > bound {
            return Err(PulseError::invalid_operation(format!(
                "Read at offset {} past tail {}",
                offset, bound
            )));
        }
        let block_idx = (offset / self.block_bytes as u64) as usize;
        let within = (offset % self.block_bytes as u64) as usize;
        let block = {
            let blocks = self.blocks.read();
            blocks[block_idx].clone()
        };
        let bytes = block.read()[within..within + self.record_size].to_vec();
        Ok(RecordView { offset, bytes })
    }

    /// Read `nrecords` consecutive records starting at `offset` into one
    /// contiguous buffer. Fails if the range extends past the tail.
    pub fn read_range(&self, offset: u64, nrecords: u64) -> Result<Vec<u8>> {
        let tail = self.tail();
        let len = nrecords * self.record_size as u64;
        if offset % self.record_size as u64 != 0 {
            return Err(PulseError::invalid_operation(format!(
                "Unaligned offset {}",
                offset
            )));
        }
        if offset + len > tail {
            return Err(PulseError::invalid_operation(format!(
                "Read of {} records at offset {} past tail {}",
                nrecords, offset, tail
            )));
        }
        let mut out = Vec::with_capacity(len as usize);
        let mut cur = offset;
        while cur < offset + len {
            out.extend_from_slice(self.read_bounded(cur, tail)?.bytes());
            cur += self.record_size as u64;
        }
        Ok(out)
    }
}

/// A snapshot of one record's bytes.
///
/// The view owns its bytes; it stays valid regardless of later appends
/// or the table being dropped.
#[derive(Debug, Clone)]
pub struct RecordView {
    offset: u64,
    bytes: Vec<u8>,
}

impl RecordView {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
