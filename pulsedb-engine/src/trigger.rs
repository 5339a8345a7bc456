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

//! Triggers, per-bucket aggregates, and the alert store
//!
//! A trigger is an aggregate predicate bound to a named filter. Each
//! matching record updates the aggregate of its millisecond bucket; a
//! bucket is closed when an append observes a strictly later bucket,
//! at which point the trigger's predicate is evaluated once against
//! the closed bucket's aggregate. Late records still update their
//! bucket's aggregate but a closed bucket is never re-evaluated.

use parking_lot::{Mutex, RwLock};
use pulsedb_core::{AggOp, TriggerExpr};
use std::collections::BTreeMap;
use std::fmt;

/// Running aggregate of one trigger over one time bucket
#[derive(Debug, Clone, Copy)]
pub struct BucketAggregate {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for BucketAggregate {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl BucketAggregate {
    fn update(&mut self, value: Option<f64>) {
        self.count += 1;
        if let Some(v) = value {
            self.sum += v;
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    fn value(&self, op: AggOp) -> f64 {
        match op {
            AggOp::Count => self.count as f64,
            AggOp::Sum => self.sum,
            AggOp::Min => self.min,
            AggOp::Max => self.max,
        }
    }
}

/// An aggregate predicate bound to a named filter
pub struct Trigger {
    name: String,
    filter_name: String,
    expr: TriggerExpr,
    state: Mutex<TriggerState>,
}

struct TriggerState {
    /// ms bucket -> running aggregate; entries persist after close so
    /// late records keep aggregating
    aggregates: BTreeMap<i64, BucketAggregate>,
    /// Highest bucket already evaluated; never re-evaluated
    closed_through: i64,
}

impl Trigger {
    pub fn new(name: impl Into<String>, filter_name: impl Into<String>, expr: TriggerExpr) -> Self {
        Self {
            name: name.into(),
            filter_name: filter_name.into(),
            expr,
            state: Mutex::new(TriggerState {
                aggregates: BTreeMap::new(),
                closed_through: i64::MIN,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    pub fn expr(&self) -> &TriggerExpr {
        &self.expr
    }

    /// Fold a matching record of the bound filter into its bucket's
    /// aggregate.
    pub fn record_match(&self, record: &[u8], bucket_ms: i64) {
        let value = self
            .expr
            .column
            .as_ref()
            .and_then(|col| col.value(record).as_f64());
        let mut state = self.state.lock();
        state.aggregates.entry(bucket_ms).or_default().update(value);
    }

    /// Observe the bucket of any append to the table. Buckets strictly
    /// below `bucket_ms` that have aggregates and were never evaluated
    /// are closed now; each firing close yields one alert.
    pub fn advance(&self, bucket_ms: i64) -> Vec<Alert> {
        let mut state = self.state.lock();
        if bucket_ms <= state.closed_through {
            return Vec::new();
        }
        let mut alerts = Vec::new();
        let closed_through = state.closed_through;
        let to_close: Vec<(i64, BucketAggregate)> = state
            .aggregates
            .range(..bucket_ms)
            .filter(|(b, _)| **b > closed_through)
            .map(|(b, agg)| (*b, *agg))
            .collect();
        for (bucket, agg) in to_close {
            let value = agg.value(self.expr.op);
            if self.expr.fires(value) {
                alerts.push(Alert {
                    trigger_name: self.name.clone(),
                    bucket_ms: bucket,
                    value,
                    message: self.expr.to_string(),
                });
            }
        }
        state.closed_through = bucket_ms - 1;
        alerts
    }
}

/// A trigger firing at one closed time bucket
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub trigger_name: String,
    pub bucket_ms: i64,
    pub value: f64,
    pub message: String,
}

impl fmt::Display for Alert {
    /// Wire contract: `trigger_name|bucket_ms|value|message`. Integral
    /// aggregate values print without a fractional part.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|", self.trigger_name, self.bucket_ms)?;
        if self.value.fract() == 0.0 && self.value.abs() < 9.0e15 {
            write!(f, "{}", self.value as i64)?;
        } else {
            write!(f, "{}", self.value)?;
        }
        write!(f, "|{}", self.message)
    }
}

/// Time-ordered alert store with range scans
#[derive(Default)]
pub struct AlertLog {
    /// ms bucket -> alerts in emission order
    alerts: RwLock<BTreeMap<i64, Vec<Alert>>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, alert: Alert) {
        self.alerts
            .write()
            .entry(alert.bucket_ms)
            .or_default()
            .push(alert);
    }

    /// Alerts whose bucket lies in `[begin_ms, end_ms]`, ascending by
    /// bucket then emission order
    pub fn range(&self, begin_ms: i64, end_ms: i64) -> Vec<Alert> {
        if begin_ms > end_ms {
            return Vec::new();
        }
        let alerts = self.alerts.read();
        let mut out = Vec::new();
        for (_, bucket) in alerts.range(begin_ms..=end_ms) {
            out.extend(bucket.iter().cloned());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.alerts.read().values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}
