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

//! Handler id registry
//!
//! Issues stable small-integer handler ids to client sessions and
//! reclaims them on deregistration. Injected into the service rather
//! than held as process-global state so tests can run isolated
//! registries.

use crate::config::MAX_HANDLERS;
use parking_lot::Mutex;
use pulsedb_core::{PulseError, Result};

/// Smallest-free-slot handler id allocator
pub struct HandlerRegistry {
    slots: Mutex<Vec<bool>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Claim the smallest free handler id
    pub fn register(&self) -> Result<u64> {
        let mut slots = self.slots.lock();
        if let Some(idx) = slots.iter().position(|in_use| !in_use) {
            slots[idx] = true;
            return Ok(idx as u64);
        }
        if slots.len() >= MAX_HANDLERS {
            return Err(PulseError::management("Could not register handler"));
        }
        slots.push(true);
        Ok((slots.len() - 1) as u64)
    }

    /// Release a previously issued id
    pub fn deregister(&self, id: u64) -> Result<()> {
        let mut slots = self.slots.lock();
        match slots.get_mut(id as usize) {
            Some(slot) if *slot => {
                *slot = false;
                Ok(())
            }
            _ => Err(PulseError::management(format!(
                "Handler {} is not registered",
                id
            ))),
        }
    }

    /// Number of currently registered handlers
    pub fn active(&self) -> usize {
        self.slots.lock().iter().filter(|in_use| **in_use).count()
    }
}
