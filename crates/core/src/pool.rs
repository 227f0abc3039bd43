// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage pools and their health states.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pool health as reported by the pool tool.
///
/// Only [`PoolHealth::Online`] counts as healthy; every other state is
/// surfaced on the event bus by the pool scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PoolHealth {
    Online,
    Degraded,
    Faulted,
    Offline,
    Unavail,
    Removed,
}

crate::simple_display! {
    PoolHealth {
        Online => "ONLINE",
        Degraded => "DEGRADED",
        Faulted => "FAULTED",
        Offline => "OFFLINE",
        Unavail => "UNAVAIL",
        Removed => "REMOVED",
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown pool health {0:?}")]
pub struct ParsePoolHealthError(pub String);

impl std::str::FromStr for PoolHealth {
    type Err = ParsePoolHealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(Self::Online),
            "DEGRADED" => Ok(Self::Degraded),
            "FAULTED" => Ok(Self::Faulted),
            "OFFLINE" => Ok(Self::Offline),
            "UNAVAIL" => Ok(Self::Unavail),
            "REMOVED" => Ok(Self::Removed),
            other => Err(ParsePoolHealthError(other.to_string())),
        }
    }
}

impl PoolHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// One storage pool, identified by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    /// Total capacity in bytes.
    pub size: u64,
    /// Allocated bytes.
    pub allocated: u64,
    /// Free bytes.
    pub free: u64,
    pub health: PoolHealth,
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
