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

//! Record batches for bulk append

/// An ordered sequence of raw records of one schema.
///
/// The batch itself is schema-agnostic; record sizes are validated
/// against the table's schema at append time.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    records: Vec<Vec<u8>>,
}

impl RecordBatch {
    pub fn records(&self) -> &[Vec<u8>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Accumulates records into a [`RecordBatch`]
#[derive(Debug, Default)]
pub struct RecordBatchBuilder {
    records: Vec<Vec<u8>>,
}

impl RecordBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: impl Into<Vec<u8>>) -> &mut Self {
        self.records.push(record.into());
        self
    }

    pub fn build(self) -> RecordBatch {
        RecordBatch {
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_builder_order() {
        let mut builder = RecordBatchBuilder::new();
        builder.add_record(vec![1u8; 4]);
        builder.add_record(vec![2u8; 4]);
        builder.add_record(vec![3u8; 4]);
        let batch = builder.build();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records()[1], vec![2u8; 4]);
    }
}
