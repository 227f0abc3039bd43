// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot policies: schedule grammar, retention grammar, validation.
//!
//! A policy names a cron schedule, a retention window, and the datasets it
//! snapshots. The schedule field accepts six-field cron, five-field cron
//! (seconds implied), or the `@hourly`-style shortcuts; everything is
//! normalized to six fields before it reaches the cron engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Names must start with a letter and stay within `[A-Za-z0-9_-]`.
    #[error("invalid policy name {0:?}")]
    InvalidName(String),

    #[error("invalid retention {0:?} (expected <N>h, <N>d, or forever)")]
    InvalidRetention(String),
}

/// How long automatic snapshots are kept before the sweep destroys them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Retention {
    Hours(u64),
    Days(u64),
    Forever,
}

impl Retention {
    /// The retention window as a duration; `None` means keep forever.
    pub fn window(&self) -> Option<Duration> {
        match self {
            Self::Hours(h) => Some(Duration::from_secs(h * 3600)),
            Self::Days(d) => Some(Duration::from_secs(d * 86400)),
            Self::Forever => None,
        }
    }
}

impl std::str::FromStr for Retention {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "forever" {
            return Ok(Self::Forever);
        }
        let parse = |num: &str| num.parse::<u64>().ok().filter(|n| *n > 0);
        if let Some(num) = s.strip_suffix('h') {
            if let Some(n) = parse(num) {
                return Ok(Self::Hours(n));
            }
        }
        if let Some(num) = s.strip_suffix('d') {
            if let Some(n) = parse(num) {
                return Ok(Self::Days(n));
            }
        }
        Err(PolicyError::InvalidRetention(s.to_string()))
    }
}

impl std::fmt::Display for Retention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hours(h) => write!(f, "{h}h"),
            Self::Days(d) => write!(f, "{d}d"),
            Self::Forever => f.write_str("forever"),
        }
    }
}

impl TryFrom<String> for Retention {
    type Error = PolicyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Retention> for String {
    fn from(r: Retention) -> Self {
        r.to_string()
    }
}

/// A named schedule + retention + target tuple driving automatic snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPolicy {
    /// Assigned by the store on first save; `0` means unsaved.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// As supplied; normalize with [`normalize_schedule`] before scheduling.
    pub schedule: String,
    pub retention: Retention,
    /// Ordered target datasets. Empty makes the policy a no-op.
    pub datasets: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SnapshotPolicy {
    /// Validate the policy name against `^[A-Za-z][A-Za-z0-9_-]*$`.
    pub fn validate_name(name: &str) -> Result<(), PolicyError> {
        let mut chars = name.chars();
        let valid_first = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        if valid_first && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            Ok(())
        } else {
            Err(PolicyError::InvalidName(name.to_string()))
        }
    }
}

crate::builder! {
    pub struct SnapshotPolicyBuilder => SnapshotPolicy {
        into {
            name: String = "daily",
            schedule: String = "@daily",
        }
        set {
            id: i64 = 0,
            retention: Retention = Retention::Forever,
            datasets: Vec<String> = vec!["tank/data".to_string()],
            enabled: bool = true,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

/// Normalize a schedule expression to six-field cron.
///
/// Shortcuts map to fixed strings, five-field expressions get a leading
/// seconds column, six-field expressions pass through unchanged. The
/// mapping is idempotent. Field semantics are not validated here; the
/// cron engine rejects nonsense downstream.
pub fn normalize_schedule(schedule: &str) -> String {
    let schedule = schedule.trim();
    match schedule {
        "@hourly" => "0 0 * * * *".to_string(),
        "@daily" => "0 0 0 * * *".to_string(),
        "@weekly" => "0 0 0 * * Sun".to_string(),
        "@monthly" => "0 0 0 1 * *".to_string(),
        other => {
            if other.split_whitespace().count() == 5 {
                format!("0 {other}")
            } else {
                other.to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
