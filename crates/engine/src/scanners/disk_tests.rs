// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::SmartReport;
use keel_exec::MockRunner;
use keel_storage::MemoryDiskStore;

struct Fixture {
    scanner: DiskScanner<keel_core::SystemClock>,
    runner: Arc<MockRunner>,
    disks: Arc<MemoryDiskStore>,
    bus: Arc<EventBus>,
}

fn fixture() -> Fixture {
    let runner = Arc::new(MockRunner::new());
    let disks = Arc::new(MemoryDiskStore::new());
    let bus = Arc::new(EventBus::new());
    let scanner = DiskScanner::new(runner.clone(), disks.clone(), bus.clone());
    Fixture { scanner, runner, disks, bus }
}

fn token() -> CancellationToken {
    CancellationToken::new()
}

fn lsblk(devices: &str) -> String {
    format!("{{\"blockdevices\": [{devices}]}}")
}

const SDA: &str = r#"{"name":"sda","path":"/dev/sda","model":"WDC WD40EFRX","serial":"S1","size":4000000000000,"rota":true,"tran":"sata","type":"disk"}"#;

#[tokio::test]
async fn new_disk_publishes_added_and_persists() {
    let f = fixture();
    f.runner.set_output("lsblk", lsblk(SDA));
    let mut events = f.bus.subscribe("disk.*");

    f.scanner.scan(&token()).await.unwrap();

    let event = events.try_recv().unwrap();
    match event.data {
        EventData::DiskAdded { disk } => assert_eq!(disk.serial, "S1"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_none(), "exactly one event");

    let attached = f.disks.list_attached().await.unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].disk.model, "WDC WD40EFRX");
    assert_eq!(attached[0].disk.tech, DiskTech::Hdd);
}

#[tokio::test]
async fn known_disk_is_refreshed_without_event() {
    let f = fixture();
    f.runner.set_output("lsblk", lsblk(SDA));
    f.scanner.scan(&token()).await.unwrap();

    let mut events = f.bus.subscribe("disk.*");
    f.scanner.scan(&token()).await.unwrap();

    assert!(events.try_recv().is_none());
    let record = f.disks.get("S1").await.unwrap().unwrap();
    assert!(record.attached);
    assert!(record.last_seen >= record.first_seen);
}

#[tokio::test]
async fn missing_disk_publishes_removed_detaches_and_evicts_smart() {
    let f = fixture();
    f.runner.push_output("lsblk", lsblk(SDA));
    f.scanner.scan(&token()).await.unwrap();
    f.disks
        .save_smart(&SmartReport {
            disk_name: "sda".into(),
            passed: true,
            temperature: 30,
            power_on_hours: 0,
            power_cycle_count: 0,
            reallocated_sectors: 0,
            pending_sectors: 0,
            uncorrectable_errors: 0,
            attributes: vec![],
            updated_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    // next enumeration: empty machine
    f.runner.set_output("lsblk", lsblk(""));
    let mut events = f.bus.subscribe("disk.removed");
    f.scanner.scan(&token()).await.unwrap();

    match events.try_recv().unwrap().data {
        EventData::DiskRemoved { disk } => assert_eq!(disk.serial, "S1"),
        other => panic!("unexpected event {other:?}"),
    }
    let record = f.disks.get("S1").await.unwrap().unwrap();
    assert!(!record.attached);
    assert!(f.disks.get_smart("sda").await.unwrap().is_none());
}

#[tokio::test]
async fn additions_are_processed_before_removals() {
    let f = fixture();
    f.runner.push_output("lsblk", lsblk(SDA));
    f.scanner.scan(&token()).await.unwrap();

    let sdb = r#"{"name":"sdb","path":"/dev/sdb","serial":"S2","size":1000,"rota":false,"type":"disk"}"#;
    f.runner.set_output("lsblk", lsblk(sdb));
    let mut events = f.bus.subscribe("disk.*");
    f.scanner.scan(&token()).await.unwrap();

    assert_eq!(events.try_recv().unwrap().kind(), "disk.added");
    assert_eq!(events.try_recv().unwrap().kind(), "disk.removed");
}

#[tokio::test]
async fn pseudo_devices_and_serialless_devices_are_skipped() {
    let f = fixture();
    let devices = [
        r#"{"name":"loop0","type":"loop","serial":"LOOP"}"#,
        r#"{"name":"zd0","type":"disk","serial":"ZVOL"}"#,
        r#"{"name":"sr0","type":"rom","serial":"ROM"}"#,
        r#"{"name":"sdx","type":"disk"}"#,
        r#"{"name":"sdy","type":"disk","serial":"  "}"#,
    ]
    .join(",");
    f.runner.set_output("lsblk", lsblk(&devices));
    let mut events = f.bus.subscribe("*");

    f.scanner.scan(&token()).await.unwrap();

    assert!(events.try_recv().is_none());
    assert!(f.disks.list_attached().await.unwrap().is_empty());
}

#[tokio::test]
async fn loop_devices_can_be_opted_in() {
    let f = fixture();
    let scanner = DiskScanner::new(f.runner.clone(), f.disks.clone(), f.bus.clone())
        .include_loop_devices(true);
    f.runner.set_output(
        "lsblk",
        lsblk(r#"{"name":"loop0","type":"loop","serial":"LOOP0","size":100}"#),
    );

    scanner.scan(&token()).await.unwrap();
    assert_eq!(f.disks.list_attached().await.unwrap().len(), 1);
}

#[tokio::test]
async fn usage_classification() {
    let f = fixture();
    let devices = [
        // system disk: child partition mounted at /
        r#"{"name":"sda","type":"disk","serial":"SYS","children":[{"name":"sda1","mountpoint":"/"}]}"#,
        // pool member with label
        r#"{"name":"sdb","type":"disk","serial":"POOL","fstype":"zfs_member","label":"tank"}"#,
        // plain filesystem
        r#"{"name":"sdc","type":"disk","serial":"FS","fstype":"ext4"}"#,
        // partitioned, nothing mounted
        r#"{"name":"sdd","type":"disk","serial":"PART","pttype":"gpt"}"#,
        // free
        r#"{"name":"sde","type":"disk","serial":"FREE"}"#,
    ]
    .join(",");
    f.runner.set_output("lsblk", lsblk(&devices));

    f.scanner.scan(&token()).await.unwrap();

    let usage = |serial: &str| {
        let disks = f.disks.clone();
        let serial = serial.to_string();
        async move { disks.get(&serial).await.unwrap().unwrap().disk.usage }
    };
    assert_eq!(usage("SYS").await, DiskUsage::System);
    assert_eq!(usage("POOL").await, DiskUsage::Pool { pool: "tank".into() });
    assert_eq!(usage("FS").await, DiskUsage::Filesystem { fstype: "ext4".into() });
    assert_eq!(usage("PART").await, DiskUsage::Partitioned);
    assert_eq!(usage("FREE").await, DiskUsage::Free);
}

#[tokio::test]
async fn nvme_and_usb_transports_override_rota() {
    let f = fixture();
    let devices = [
        r#"{"name":"nvme0n1","type":"disk","serial":"NV","tran":"nvme","rota":false}"#,
        r#"{"name":"sdu","type":"disk","serial":"USB","tran":"usb","rota":true}"#,
    ]
    .join(",");
    f.runner.set_output("lsblk", lsblk(&devices));

    f.scanner.scan(&token()).await.unwrap();

    assert_eq!(f.disks.get("NV").await.unwrap().unwrap().disk.tech, DiskTech::Nvme);
    assert_eq!(f.disks.get("USB").await.unwrap().unwrap().disk.tech, DiskTech::Usb);
}

#[tokio::test]
async fn unparseable_output_is_a_parse_error() {
    let f = fixture();
    f.runner.set_output("lsblk", "not json");
    assert!(matches!(
        f.scanner.scan(&token()).await.unwrap_err(),
        ScanError::Parse { tool: "lsblk", .. }
    ));
}
