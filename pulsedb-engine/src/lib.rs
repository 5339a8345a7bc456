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

//! PulseDB Engine
//!
//! The in-memory log-table engine: an append-only record arena with
//! stable offsets, per-column bucketed indexes maintained synchronously
//! with appends, named filters with millisecond time partitioning,
//! trigger-driven alerting over closed time buckets, and the table
//! registry.
//!
//! ## Append data flow
//!
//! ```text
//! Table::append
//!   └─► RecordLog (offset)
//!        └─► ColumnIndex (per indexed column)
//!             └─► NamedFilter (per registered filter)
//!                  └─► Trigger aggregates (per trigger on a match)
//!                       └─► AlertLog (on bucket close)
//! ```
//!
//! Readers never take the append lock; they snapshot the atomically
//! published tail and see complete records at or below it.

pub mod config;
pub mod filter;
pub mod index;
pub mod log;
pub mod registry;
pub mod store;
pub mod streams;
pub mod table;
pub mod trigger;

pub use filter::NamedFilter;
pub use index::{BucketKey, ColumnIndex};
pub use log::{RecordLog, RecordView};
pub use registry::HandlerRegistry;
pub use store::Store;
pub use streams::{AlertStream, RecordStream};
pub use table::{StorageMode, Table};
pub use trigger::{Alert, AlertLog, BucketAggregate, Trigger};
