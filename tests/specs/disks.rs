// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk attach/detach reconciliation specs.

use crate::prelude::*;
use keel_core::EventData;
use keel_engine::Scanner;

const SDA: &str = r#"{"blockdevices":[
    {"name":"sda","path":"/dev/sda","model":"WDC WD10EFRX","serial":"S1","size":1000,"rota":true,"type":"disk"}
]}"#;

const SDB: &str = r#"{"blockdevices":[
    {"name":"sdb","path":"/dev/sdb","model":"WDC WD10EFRX","serial":"S2","size":1000,"rota":true,"type":"disk"}
]}"#;

const EMPTY: &str = r#"{"blockdevices":[]}"#;

/// A disk appearing in enumeration publishes exactly one `disk.added`
/// and lands attached in the store.
#[tokio::test]
async fn observing_a_new_disk() {
    let rig = Rig::new();
    rig.runner.set_output("lsblk", SDA);
    let mut events = rig.bus.subscribe("disk.added");

    rig.disk_scanner().scan(&token()).await.unwrap();

    match events.try_recv().unwrap().data {
        EventData::DiskAdded { disk } => assert_eq!(disk.serial, "S1"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_none());

    let attached = rig.disks.list_attached().await.unwrap();
    assert_eq!(attached.len(), 1);
    assert!(attached[0].attached);
}

/// A disk vanishing from enumeration publishes `disk.removed`, detaches
/// the record, and evicts its SMART cache entry.
#[tokio::test]
async fn losing_a_known_disk() {
    let rig = Rig::new();
    rig.runner.push_output("lsblk", SDB);
    let scanner = rig.disk_scanner();
    scanner.scan(&token()).await.unwrap();

    // seed a SMART cache entry for the disk
    rig.runner.set_output("smartctl", r#"{"smart_status":{"passed":true}}"#);
    rig.smart_scanner(std::time::Duration::from_millis(1))
        .scan(&token())
        .await
        .unwrap();
    assert!(rig.disks.get_smart("sdb").await.unwrap().is_some());

    rig.runner.set_output("lsblk", EMPTY);
    let mut events = rig.bus.subscribe("disk.removed");
    scanner.scan(&token()).await.unwrap();

    match events.try_recv().unwrap().data {
        EventData::DiskRemoved { disk } => assert_eq!(disk.serial, "S2"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_none());

    let record = rig.disks.get("S2").await.unwrap().unwrap();
    assert!(!record.attached);
    assert!(rig.disks.get_smart("sdb").await.unwrap().is_none());
}
