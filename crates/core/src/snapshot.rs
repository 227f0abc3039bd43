// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automatic snapshot name grammar.
//!
//! Scheduler-created snapshots are named
//! `<dataset>@auto-<policy>-<YYYYMMDD>-<HHMMSS>`. The retention sweep
//! recognizes its own snapshots solely by this grammar; anything else on
//! the dataset is left alone.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Prefix marking a snapshot as scheduler-owned.
pub const AUTO_PREFIX: &str = "auto-";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Build the snapshot sub-name for a policy firing at `at`.
pub fn auto_snapshot_name(policy: &str, at: DateTime<Utc>) -> String {
    format!("{AUTO_PREFIX}{policy}-{}", at.format(TIMESTAMP_FORMAT))
}

/// Parse the creation time out of a snapshot sub-name owned by `policy`.
///
/// Returns `None` when the name does not belong to the policy or the
/// trailing timestamp does not parse; callers must treat that as
/// "not a candidate", never as "expired".
pub fn parse_auto_snapshot(sub_name: &str, policy: &str) -> Option<DateTime<Utc>> {
    let ts = sub_name
        .strip_prefix(AUTO_PREFIX)?
        .strip_prefix(policy)?
        .strip_prefix('-')?;
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Split a full snapshot name into `(dataset, sub_name)`.
pub fn split_snapshot(full: &str) -> Option<(&str, &str)> {
    let (dataset, sub) = full.split_once('@')?;
    if dataset.is_empty() || sub.is_empty() {
        return None;
    }
    Some((dataset, sub))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
