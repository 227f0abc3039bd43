// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk presence scanner.
//!
//! Reconciles the block devices the kernel reports against the persisted
//! disk records: new serials publish `disk.added`, missing serials
//! publish `disk.removed`, get detached, and lose their SMART cache
//! entry. Additions are processed before removals.

use keel_core::{Clock, Disk, DiskTech, DiskUsage, EventData};
use keel_exec::Runner;
use keel_storage::DiskStore;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;
use crate::monitor::{ScanError, Scanner};

const LSBLK_COLUMNS: &str = "NAME,PATH,MODEL,SERIAL,SIZE,ROTA,TRAN,TYPE,FSTYPE,PTTYPE,MOUNTPOINT,LABEL";

/// Kernel name prefix of pool-backed volumes; these are pool children,
/// not physical disks.
const ZVOL_PREFIX: &str = "zd";

pub struct DiskScanner<C: Clock> {
    runner: Arc<dyn Runner>,
    disks: Arc<dyn DiskStore>,
    bus: Arc<EventBus<C>>,
    include_loop_devices: bool,
}

impl<C: Clock> DiskScanner<C> {
    pub fn new(runner: Arc<dyn Runner>, disks: Arc<dyn DiskStore>, bus: Arc<EventBus<C>>) -> Self {
        Self { runner, disks, bus, include_loop_devices: false }
    }

    /// Also scan `loop` devices (useful on development machines).
    pub fn include_loop_devices(mut self, include: bool) -> Self {
        self.include_loop_devices = include;
        self
    }

    async fn enumerate(&self, cancel: &CancellationToken) -> Result<Vec<Disk>, ScanError> {
        let out = self
            .runner
            .output(cancel, "lsblk", &["--json", "--bytes", "-o", LSBLK_COLUMNS])
            .await?;
        let parsed: LsblkOutput = serde_json::from_slice(&out)
            .map_err(|err| ScanError::Parse { tool: "lsblk", message: err.to_string() })?;
        Ok(parsed
            .blockdevices
            .iter()
            .filter_map(|dev| self.to_disk(dev))
            .collect())
    }

    fn to_disk(&self, dev: &LsblkDevice) -> Option<Disk> {
        match dev.kind.as_deref() {
            Some("disk") => {}
            Some("loop") if self.include_loop_devices => {}
            _ => return None,
        }
        if dev.name.starts_with(ZVOL_PREFIX) {
            return None;
        }
        // serial is the stable identity; devices without one cannot be
        // tracked across rounds
        let serial = dev.serial.as_deref()?.trim();
        if serial.is_empty() {
            return None;
        }

        Some(Disk {
            serial: serial.to_string(),
            name: dev.name.clone(),
            path: dev
                .path
                .clone()
                .unwrap_or_else(|| format!("/dev/{}", dev.name)),
            model: dev.model.clone().unwrap_or_default().trim().to_string(),
            size: dev.size.unwrap_or(0),
            tech: dev.tech(),
            usage: dev.usage(),
            health: Default::default(),
            temperature: None,
        })
    }
}

#[async_trait::async_trait]
impl<C: Clock + 'static> Scanner for DiskScanner<C> {
    fn name(&self) -> &'static str {
        "disks"
    }

    async fn scan(&self, cancel: &CancellationToken) -> Result<(), ScanError> {
        let observed = self.enumerate(cancel).await?;
        let known = self.disks.list_attached().await?;

        let known_serials: HashSet<&str> =
            known.iter().map(|r| r.disk.serial.as_str()).collect();
        let observed_serials: HashSet<&str> =
            observed.iter().map(|d| d.serial.as_str()).collect();

        // additions and refreshes first
        for disk in &observed {
            if !known_serials.contains(disk.serial.as_str()) {
                tracing::info!(disk = %disk.name, serial = %disk.serial, "disk attached");
                self.bus.emit(EventData::DiskAdded { disk: disk.clone() });
            }
            self.disks.save(disk).await?;
        }

        // then removals
        for record in &known {
            if observed_serials.contains(record.disk.serial.as_str()) {
                continue;
            }
            tracing::info!(
                disk = %record.disk.name,
                serial = %record.disk.serial,
                "disk detached"
            );
            self.bus.emit(EventData::DiskRemoved { disk: record.disk.clone() });
            self.disks.mark_detached(&record.disk.name, &record.disk.serial).await?;
            self.disks.delete_smart(&record.disk.name).await?;
        }

        Ok(())
    }
}

// -- lsblk JSON schema (the slice of it keel reads) --

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

#[derive(Debug, Default, Deserialize)]
struct LsblkDevice {
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    serial: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    rota: Option<bool>,
    #[serde(default)]
    tran: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    fstype: Option<String>,
    #[serde(default)]
    pttype: Option<String>,
    #[serde(default)]
    mountpoint: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    children: Vec<LsblkDevice>,
}

impl LsblkDevice {
    fn tech(&self) -> DiskTech {
        match self.tran.as_deref() {
            Some("nvme") => DiskTech::Nvme,
            Some("usb") => DiskTech::Usb,
            _ => match self.rota {
                Some(true) => DiskTech::Hdd,
                Some(false) => DiskTech::Ssd,
                None => DiskTech::Unknown,
            },
        }
    }

    fn holds_root(&self) -> bool {
        self.mountpoint.as_deref() == Some("/")
            || self.children.iter().any(LsblkDevice::holds_root)
    }

    fn usage(&self) -> DiskUsage {
        if self.holds_root() {
            return DiskUsage::System;
        }
        if let Some(fstype) = self.fstype.as_deref() {
            if fstype == "zfs_member" {
                return DiskUsage::Pool {
                    pool: self.label.clone().unwrap_or_default(),
                };
            }
            return DiskUsage::Filesystem { fstype: fstype.to_string() };
        }
        if self.pttype.is_some() || !self.children.is_empty() {
            return DiskUsage::Partitioned;
        }
        DiskUsage::Free
    }
}

#[cfg(test)]
#[path = "disk_tests.rs"]
mod tests;
