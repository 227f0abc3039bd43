// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweep specs.

use crate::prelude::*;
use keel_core::{auto_snapshot_name, Retention, SnapshotPolicy};

/// With a 1 h retention, the sweep destroys the stale automatic
/// snapshot and leaves the fresh one (and everything foreign) alone.
#[tokio::test]
async fn sweep_destroys_exactly_the_expired_snapshot() {
    let rig = Rig::new();
    rig.policies
        .create(
            &SnapshotPolicy::builder()
                .name("daily")
                .retention(Retention::Hours(1))
                .datasets(vec!["tank/data".into()])
                .build(),
        )
        .await
        .unwrap();

    let fresh = format!(
        "tank/data@{}",
        auto_snapshot_name("daily", chrono::Utc::now())
    );
    rig.runner.set_output(
        "zfs",
        format!("tank/data@auto-daily-20200101-000000\n{fresh}\n"),
    );

    rig.scheduler().run_retention_sweep(&token()).await.unwrap();

    let calls = rig.runner.calls();
    let destroyed: Vec<_> = calls
        .iter()
        .filter(|c| c.args.first().map(String::as_str) == Some("destroy"))
        .collect();
    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0].args[1], "tank/data@auto-daily-20200101-000000");
}
