// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn disk_builder_defaults() {
    let disk = Disk::builder().build();
    assert_eq!(disk.serial, "TEST-SERIAL");
    assert_eq!(disk.name, "sda");
    assert_eq!(disk.usage, DiskUsage::Free);
}

#[test]
fn disk_serde_roundtrip() {
    let disk = Disk::builder()
        .serial("WD-1234")
        .usage(DiskUsage::Pool { pool: "tank".into() })
        .temperature(Some(38))
        .build();
    let json = serde_json::to_string(&disk).unwrap();
    let back: Disk = serde_json::from_str(&json).unwrap();
    assert_eq!(back, disk);
}

#[test]
fn disk_usage_tagged_encoding() {
    let usage = DiskUsage::Pool { pool: "tank".into() };
    let json = serde_json::to_value(&usage).unwrap();
    assert_eq!(json["kind"], "pool");
    assert_eq!(json["pool"], "tank");
}

#[test]
fn disk_health_defaults_to_unknown() {
    let json = r#"{"serial":"S","name":"sda","path":"/dev/sda","model":"M","size":1,"tech":"hdd","usage":{"kind":"free"}}"#;
    let disk: Disk = serde_json::from_str(json).unwrap();
    assert_eq!(disk.health, DiskHealth::Unknown);
    assert_eq!(disk.temperature, None);
}

#[test]
fn tech_display_names() {
    assert_eq!(DiskTech::Hdd.to_string(), "hdd");
    assert_eq!(DiskTech::Nvme.to_string(), "nvme");
}

#[test]
fn smart_report_attribute_lookup() {
    let report = SmartReport {
        disk_name: "sda".into(),
        passed: true,
        temperature: 35,
        power_on_hours: 100,
        power_cycle_count: 10,
        reallocated_sectors: 0,
        pending_sectors: 0,
        uncorrectable_errors: 0,
        attributes: vec![SmartAttribute {
            id: 5,
            name: "Reallocated_Sector_Ct".into(),
            value: 100,
            worst: 100,
            threshold: 10,
            raw: 0,
            failed: false,
        }],
        updated_at: Utc::now(),
    };
    assert_eq!(report.attribute(5).map(|a| a.raw), Some(0));
    assert!(report.attribute(197).is_none());
}
