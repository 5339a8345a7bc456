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

//! PulseDB gRPC Services
//!
//! The streaming RPC front for the log-table engine. Clients register a
//! handler session, select a current table, append records, and pull
//! query results through paginated server-side cursors:
//!
//! - **ad-hoc** cursors over compiled filter expressions
//! - **predefined** cursors over a named filter's time window
//! - **combined** cursors narrowing a named filter by an expression
//! - **alert** cursors over trigger firings
//!
//! Every request after `RegisterHandler` carries the issued handler id;
//! `GetMore` additionally validates the cursor descriptor's handler id
//! against the session, so cursors never leak across sessions.

pub mod proto {
    // Include generated protobuf code
    tonic::include_proto!("pulsedb.v1");
}

pub mod error;
pub mod server;
pub mod session;

pub use error::RpcError;
pub use server::LogTableServer;
pub use session::{CursorDescriptor, CursorKind, Page, PayloadKind, Session};
