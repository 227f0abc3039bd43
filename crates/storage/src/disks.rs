// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk records and the SMART cache.

use crate::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use keel_core::{Disk, DiskRecord, SmartReport};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistence for disk observations and their SMART samples.
///
/// Disk records are keyed by serial and never deleted; the SMART cache is
/// keyed by kernel name and evicted when its disk detaches.
#[async_trait]
pub trait DiskStore: Send + Sync {
    /// Upsert an observation: refreshes mutable attributes and
    /// `last_seen`, marks the record attached, and stamps `first_seen`
    /// on the first sighting.
    async fn save(&self, disk: &Disk) -> Result<(), StorageError>;

    /// Mark a disk as no longer attached.
    async fn mark_detached(&self, name: &str, serial: &str) -> Result<(), StorageError>;

    /// All records currently marked attached.
    async fn list_attached(&self) -> Result<Vec<DiskRecord>, StorageError>;

    async fn get(&self, serial: &str) -> Result<Option<DiskRecord>, StorageError>;

    /// Overwrite the SMART cache entry for the report's disk.
    async fn save_smart(&self, report: &SmartReport) -> Result<(), StorageError>;

    async fn get_smart(&self, name: &str) -> Result<Option<SmartReport>, StorageError>;

    /// Drop the SMART cache entry for a disk. Missing entries are fine.
    async fn delete_smart(&self, name: &str) -> Result<(), StorageError>;
}

/// In-memory [`DiskStore`].
#[derive(Default)]
pub struct MemoryDiskStore {
    records: RwLock<HashMap<String, DiskRecord>>,
    smart: RwLock<HashMap<String, SmartReport>>,
}

impl MemoryDiskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiskStore for MemoryDiskStore {
    async fn save(&self, disk: &Disk) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut records = self.records.write();
        match records.get_mut(&disk.serial) {
            Some(record) => {
                record.disk = disk.clone();
                record.attached = true;
                record.last_seen = now;
            }
            None => {
                records.insert(
                    disk.serial.clone(),
                    DiskRecord {
                        disk: disk.clone(),
                        attached: true,
                        first_seen: now,
                        last_seen: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn mark_detached(&self, _name: &str, serial: &str) -> Result<(), StorageError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(serial)
            .ok_or_else(|| StorageError::not_found("disk", serial))?;
        record.attached = false;
        Ok(())
    }

    async fn list_attached(&self) -> Result<Vec<DiskRecord>, StorageError> {
        let mut attached: Vec<DiskRecord> =
            self.records.read().values().filter(|r| r.attached).cloned().collect();
        attached.sort_by(|a, b| a.disk.serial.cmp(&b.disk.serial));
        Ok(attached)
    }

    async fn get(&self, serial: &str) -> Result<Option<DiskRecord>, StorageError> {
        Ok(self.records.read().get(serial).cloned())
    }

    async fn save_smart(&self, report: &SmartReport) -> Result<(), StorageError> {
        self.smart.write().insert(report.disk_name.clone(), report.clone());
        Ok(())
    }

    async fn get_smart(&self, name: &str) -> Result<Option<SmartReport>, StorageError> {
        Ok(self.smart.read().get(name).cloned())
    }

    async fn delete_smart(&self, name: &str) -> Result<(), StorageError> {
        self.smart.write().remove(name);
        Ok(())
    }
}

#[cfg(test)]
#[path = "disks_tests.rs"]
mod tests;
