// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Physical disk observations and SMART health reports.
//!
//! A [`Disk`] is one enumeration-round observation of a block device; its
//! stable identity is the serial number. [`DiskRecord`] is the persisted
//! form tracking attachment over time. [`SmartReport`] is the cached
//! health sample for one disk, overwritten on every collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage technology reported by the block layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskTech {
    /// Rotational media
    Hdd,
    /// Solid-state, SATA-attached
    Ssd,
    /// Non-volatile memory express
    Nvme,
    /// USB-attached, technology unknown
    Usb,
    Unknown,
}

crate::simple_display! {
    DiskTech {
        Hdd => "hdd",
        Ssd => "ssd",
        Nvme => "nvme",
        Usb => "usb",
        Unknown => "unknown",
    }
}

/// How a disk is currently used, as far as enumeration can tell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiskUsage {
    /// No filesystem, no partitions, not in a pool
    Free,
    /// Member device of a storage pool
    Pool { pool: String },
    /// Carries a filesystem directly
    Filesystem { fstype: String },
    /// Has a partition table
    Partitioned,
    /// Holds the operating system root
    System,
}

/// Last known health verdict for a disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskHealth {
    Healthy,
    Failing,
    #[default]
    Unknown,
}

crate::simple_display! {
    DiskHealth {
        Healthy => "healthy",
        Failing => "failing",
        Unknown => "unknown",
    }
}

/// One observation of a physical block device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    /// Stable identity across renames and reboots.
    pub serial: String,
    /// Kernel name, e.g. `sda`.
    pub name: String,
    /// Device node path, e.g. `/dev/sda`.
    pub path: String,
    pub model: String,
    /// Capacity in bytes.
    pub size: u64,
    pub tech: DiskTech,
    pub usage: DiskUsage,
    #[serde(default)]
    pub health: DiskHealth,
    /// Degrees Celsius, when the device reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
}

crate::builder! {
    pub struct DiskBuilder => Disk {
        into {
            serial: String = "TEST-SERIAL",
            name: String = "sda",
            path: String = "/dev/sda",
            model: String = "Test Disk",
        }
        set {
            size: u64 = 1 << 40,
            tech: DiskTech = DiskTech::Hdd,
            usage: DiskUsage = DiskUsage::Free,
            health: DiskHealth = DiskHealth::Unknown,
            temperature: Option<i64> = None,
        }
    }
}

/// Persisted record of a disk, tracking attachment over time.
///
/// Records are never deleted: a disk that disappears from enumeration is
/// marked detached and keeps its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskRecord {
    #[serde(flatten)]
    pub disk: Disk,
    pub attached: bool,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// One SMART attribute row as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartAttribute {
    pub id: u16,
    pub name: String,
    pub value: i64,
    pub worst: i64,
    pub threshold: i64,
    pub raw: i64,
    pub failed: bool,
}

/// Cached SMART sample for one disk, keyed by kernel name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartReport {
    pub disk_name: String,
    /// Overall self-assessment verdict.
    pub passed: bool,
    pub temperature: i64,
    pub power_on_hours: i64,
    pub power_cycle_count: i64,
    pub reallocated_sectors: i64,
    pub pending_sectors: i64,
    pub uncorrectable_errors: i64,
    pub attributes: Vec<SmartAttribute>,
    pub updated_at: DateTime<Utc>,
}

impl SmartReport {
    /// Attribute lookup by SMART id.
    pub fn attribute(&self, id: u16) -> Option<&SmartAttribute> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
#[path = "disk_tests.rs"]
mod tests;
