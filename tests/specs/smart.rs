// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SMART failure surfacing specs.

use crate::prelude::*;
use keel_core::EventData;
use keel_engine::Scanner;
use std::time::Duration;

const SDA: &str = r#"{"blockdevices":[
    {"name":"sda","path":"/dev/sda","serial":"S1","size":1000,"rota":true,"type":"disk"}
]}"#;

/// A probe reporting `passed: false` publishes exactly one
/// `smart.failed` carrying the disk name and the failing report.
#[tokio::test]
async fn failing_probe_raises_an_event() {
    let rig = Rig::new();
    rig.runner.set_output("lsblk", SDA);
    rig.disk_scanner().scan(&token()).await.unwrap();

    rig.runner.set_output(
        "smartctl",
        r#"{"smart_status":{"passed":false},"temperature":{"current":55}}"#,
    );
    let mut events = rig.bus.subscribe("smart.failed");

    rig.smart_scanner(Duration::from_millis(1)).scan(&token()).await.unwrap();

    match events.try_recv().unwrap().data {
        EventData::SmartFailed { disk, report } => {
            assert_eq!(disk, "sda");
            assert!(!report.passed);
            assert_eq!(report.temperature, 55);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_none());

    // the failing report is cached too
    assert!(!rig.disks.get_smart("sda").await.unwrap().unwrap().passed);
}
