// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

#[test]
fn name_formats_timestamp() {
    let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(auto_snapshot_name("daily", at), "auto-daily-20200101-000000");
}

#[test]
fn parse_recovers_creation_time() {
    let at = Utc.with_ymd_and_hms(2023, 6, 15, 13, 45, 30).unwrap();
    let name = auto_snapshot_name("hourly", at);
    assert_eq!(parse_auto_snapshot(&name, "hourly"), Some(at));
}

#[parameterized(
    foreign_prefix = { "manual-20200101-000000", "daily" },
    other_policy = { "auto-weekly-20200101-000000", "daily" },
    policy_name_extended = { "auto-daily2-20200101-000000", "daily" },
    missing_separator = { "auto-daily20200101-000000", "daily" },
    garbage_timestamp = { "auto-daily-yesterday", "daily" },
    out_of_range_timestamp = { "auto-daily-20201301-000000", "daily" },
    empty = { "", "daily" },
)]
fn parse_rejects_non_candidates(sub_name: &str, policy: &str) {
    assert_eq!(parse_auto_snapshot(sub_name, policy), None);
}

#[test]
fn parse_handles_dashed_policy_names() {
    let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let name = auto_snapshot_name("off-site", at);
    assert_eq!(parse_auto_snapshot(&name, "off-site"), Some(at));
    // a different policy must not claim it
    assert_eq!(parse_auto_snapshot(&name, "off"), None);
}

#[parameterized(
    plain = { "tank/data@auto-daily-20200101-000000", Some(("tank/data", "auto-daily-20200101-000000")) },
    no_at = { "tank/data", None },
    empty_dataset = { "@snap", None },
    empty_sub = { "tank/data@", None },
)]
fn split_full_names(full: &str, expected: Option<(&str, &str)>) {
    assert_eq!(split_snapshot(full), expected);
}
