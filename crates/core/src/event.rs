// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types flowing over the in-process bus.
//!
//! Every event carries a hierarchical dotted kind (`disk.added`,
//! `pool.degraded`, ...) plus a typed payload. Serializes with
//! `{"type": "disk.added", ...fields}` format so the notification
//! persister can store `(kind, blob)` pairs.

use crate::disk::{Disk, SmartReport};
use crate::pool::Pool;
use serde::{Deserialize, Serialize};

/// Typed payload, one variant per event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventData {
    #[serde(rename = "disk.added")]
    DiskAdded { disk: Disk },

    #[serde(rename = "disk.removed")]
    DiskRemoved { disk: Disk },

    /// A SMART sample whose overall verdict is "failing".
    #[serde(rename = "smart.failed")]
    SmartFailed { disk: String, report: SmartReport },

    #[serde(rename = "pool.degraded")]
    PoolDegraded { pool: Pool },

    /// A previously unhealthy pool returned to ONLINE.
    #[serde(rename = "pool.online")]
    PoolOnline { pool: Pool },

    #[serde(rename = "dataset.created")]
    DatasetCreated { name: String },

    #[serde(rename = "dataset.destroyed")]
    DatasetDestroyed { name: String },
}

impl EventData {
    /// Canonical dotted kind name, as used for subscription matching.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DiskAdded { .. } => "disk.added",
            Self::DiskRemoved { .. } => "disk.removed",
            Self::SmartFailed { .. } => "smart.failed",
            Self::PoolDegraded { .. } => "pool.degraded",
            Self::PoolOnline { .. } => "pool.online",
            Self::DatasetCreated { .. } => "dataset.created",
            Self::DatasetDestroyed { .. } => "dataset.destroyed",
        }
    }

    /// One-line summary for daemon logs.
    pub fn summary(&self) -> String {
        let t = self.kind();
        match self {
            Self::DiskAdded { disk } | Self::DiskRemoved { disk } => {
                format!("{t} disk={} serial={}", disk.name, disk.serial)
            }
            Self::SmartFailed { disk, .. } => format!("{t} disk={disk}"),
            Self::PoolDegraded { pool } | Self::PoolOnline { pool } => {
                format!("{t} pool={} health={}", pool.name, pool.health)
            }
            Self::DatasetCreated { name } | Self::DatasetDestroyed { name } => {
                format!("{t} dataset={name}")
            }
        }
    }
}

/// An event as published on the bus. Immutable after publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub data: EventData,
    /// Epoch milliseconds; `0` means not yet stamped (the bus fills it in).
    #[serde(default)]
    pub time: u64,
}

impl Event {
    pub fn new(data: EventData) -> Self {
        Self { data, time: 0 }
    }

    pub fn kind(&self) -> &'static str {
        self.data.kind()
    }
}

impl From<EventData> for Event {
    fn from(data: EventData) -> Self {
        Self::new(data)
    }
}

/// Subscription pattern matching.
///
/// Three pattern forms:
/// 1. `"*"` matches every kind.
/// 2. `"prefix.*"` matches `prefix.X` for any non-empty `X`
///    (including further dots).
/// 3. Anything else matches by literal equality.
pub fn pattern_matches(pattern: &str, kind: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix(".*") {
        return kind
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|rest| !rest.is_empty());
    }
    pattern == kind
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
