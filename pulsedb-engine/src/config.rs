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

//! Engine tunables

/// Records per arena block; block byte size is `record_size * BLOCK_RECORDS`.
pub const BLOCK_RECORDS: usize = 1024;

/// Items returned per cursor page.
pub const ITERATOR_BATCH_SIZE: usize = 64;

/// Cap on concurrently served client sessions.
pub const MAX_CONCURRENCY: usize = 128;

/// Cap on registered handler slots.
pub const MAX_HANDLERS: usize = 4096;
