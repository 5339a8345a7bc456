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

//! Error types for PulseDB

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    /// Bad schema, duplicate name, missing table/column/filter/trigger/index.
    #[error("{0}")]
    Management(String),

    /// Unknown cursor, handler id mismatch, out-of-bounds read.
    #[error("{0}")]
    InvalidOperation(String),

    /// Expression could not be compiled.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Schema construction failure (duplicate column, zero-width string).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invariant violation; fatal for the current session.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PulseError {
    pub fn management(msg: impl Into<String>) -> Self {
        PulseError::Management(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        PulseError::InvalidOperation(msg.into())
    }

    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        PulseError::Parse {
            position,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
