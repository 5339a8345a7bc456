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

//! Error types for the gRPC service
//!
//! The engine's error kinds map onto three wire-visible categories:
//! management failures, invalid operations, and internal faults. Parse
//! errors fold into management during filter/trigger registration and
//! into invalid-operation during ad-hoc and combined queries.

use pulsedb_core::PulseError;
use thiserror::Error;
use tonic::Status;

/// Errors surfaced by the RPC layer
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("{0}")]
    Management(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcError {
    /// Engine error of a management operation (create/set/add/remove);
    /// parse failures surface as management errors here.
    pub fn management(err: PulseError) -> Self {
        match err {
            PulseError::InvalidOperation(msg) => RpcError::InvalidOperation(msg),
            PulseError::Internal(msg) => RpcError::Internal(msg),
            other => RpcError::Management(other.to_string()),
        }
    }

    /// Engine error of a query operation (ad-hoc/combined/cursor);
    /// parse failures surface as invalid operations here.
    pub fn query(err: PulseError) -> Self {
        match err {
            PulseError::Management(msg) | PulseError::Schema(msg) => RpcError::Management(msg),
            PulseError::Internal(msg) => RpcError::Internal(msg),
            other => RpcError::InvalidOperation(other.to_string()),
        }
    }
}

impl From<RpcError> for Status {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Management(msg) => Status::failed_precondition(msg),
            RpcError::InvalidOperation(msg) => Status::invalid_argument(msg),
            RpcError::Internal(msg) => Status::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_mapping_depends_on_context() {
        let parse = || PulseError::parse(3, "bad token");
        assert!(matches!(
            RpcError::management(parse()),
            RpcError::Management(_)
        ));
        assert!(matches!(
            RpcError::query(parse()),
            RpcError::InvalidOperation(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let status: Status = RpcError::Management("No such table t".into()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        assert_eq!(status.message(), "No such table t");

        let status: Status = RpcError::InvalidOperation("handler_id mismatch".into()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: Status = RpcError::Internal("corrupt index".into()).into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
