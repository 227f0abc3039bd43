// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SMART health scanner.
//!
//! Collection is slow, so this scanner runs on its own interval gated
//! by the clock rather than on every monitor tick. Per-disk failures
//! are logged and never stop the remaining disks. The probe tool
//! reports disk trouble through exit-status bits; only the low fatal
//! bits make the output unusable.

use chrono::Utc;
use keel_core::{Clock, Disk, EventData, SmartAttribute, SmartReport};
use keel_exec::{smart_exit_fatal, Runner};
use keel_storage::DiskStore;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;
use crate::monitor::{ScanError, Scanner};

/// SMART attribute ids for the aggregated counters.
const ATTR_REALLOCATED: u16 = 5;
const ATTR_PENDING: u16 = 197;
const ATTR_UNCORRECTABLE: u16 = 198;

pub struct SmartScanner<C: Clock> {
    runner: Arc<dyn Runner>,
    disks: Arc<dyn DiskStore>,
    bus: Arc<EventBus<C>>,
    clock: C,
    interval: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl<C: Clock> SmartScanner<C> {
    pub fn new(
        runner: Arc<dyn Runner>,
        disks: Arc<dyn DiskStore>,
        bus: Arc<EventBus<C>>,
        clock: C,
        interval: Duration,
    ) -> Self {
        Self { runner, disks, bus, clock, interval, last_run: Mutex::new(None) }
    }

    /// True when enough time has passed since the previous collection.
    /// Claims the slot, so concurrent rounds cannot double-collect.
    fn due(&self) -> bool {
        let now = self.clock.now();
        let mut last_run = self.last_run.lock();
        if let Some(last) = *last_run {
            if now.duration_since(last) < self.interval {
                return false;
            }
        }
        *last_run = Some(now);
        true
    }

    async fn collect(&self, cancel: &CancellationToken, disk: &Disk) -> Result<(), ScanError> {
        let out = match self.runner.output(cancel, "smartctl", &["-a", "-j", &disk.path]).await {
            Ok(out) => out,
            Err(err) => match err.exit_code() {
                // informational exit bits: the report is still usable
                Some(code) if !smart_exit_fatal(code) => {
                    err.exit_stdout().map(<[u8]>::to_vec).unwrap_or_default()
                }
                _ => return Err(err.into()),
            },
        };

        let report = parse_report(&disk.name, &out)?;
        self.disks.save_smart(&report).await?;

        if !report.passed {
            tracing::warn!(disk = %disk.name, serial = %disk.serial, "SMART verdict: failing");
            self.bus.emit(EventData::SmartFailed { disk: disk.name.clone(), report });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C: Clock + 'static> Scanner for SmartScanner<C> {
    fn name(&self) -> &'static str {
        "smart"
    }

    async fn scan(&self, cancel: &CancellationToken) -> Result<(), ScanError> {
        if !self.due() {
            return Ok(());
        }

        for record in self.disks.list_attached().await? {
            if cancel.is_cancelled() {
                break;
            }
            if let Err(err) = self.collect(cancel, &record.disk).await {
                tracing::warn!(disk = %record.disk.name, %err, "SMART collection failed");
            }
        }
        Ok(())
    }
}

/// Build a [`SmartReport`] from the probe tool's JSON output.
fn parse_report(disk_name: &str, out: &[u8]) -> Result<SmartReport, ScanError> {
    let parsed: SmartctlOutput = serde_json::from_slice(out)
        .map_err(|err| ScanError::Parse { tool: "smartctl", message: err.to_string() })?;

    let attributes: Vec<SmartAttribute> = parsed
        .ata_smart_attributes
        .map(|attrs| attrs.table.into_iter().map(AtaAttribute::into_attribute).collect())
        .unwrap_or_default();

    let raw_of = |id: u16| attributes.iter().find(|a| a.id == id).map(|a| a.raw).unwrap_or(0);

    Ok(SmartReport {
        disk_name: disk_name.to_string(),
        passed: parsed.smart_status.map(|s| s.passed).unwrap_or(false),
        temperature: parsed.temperature.map(|t| t.current).unwrap_or(0),
        power_on_hours: parsed.power_on_time.map(|p| p.hours).unwrap_or(0),
        power_cycle_count: parsed.power_cycle_count.unwrap_or(0),
        reallocated_sectors: raw_of(ATTR_REALLOCATED),
        pending_sectors: raw_of(ATTR_PENDING),
        uncorrectable_errors: raw_of(ATTR_UNCORRECTABLE),
        attributes,
        updated_at: Utc::now(),
    })
}

// -- smartctl JSON schema (the slice of it keel reads) --

#[derive(Debug, Deserialize)]
struct SmartctlOutput {
    #[serde(default)]
    smart_status: Option<SmartStatus>,
    #[serde(default)]
    temperature: Option<Temperature>,
    #[serde(default)]
    power_on_time: Option<PowerOnTime>,
    #[serde(default)]
    power_cycle_count: Option<i64>,
    #[serde(default)]
    ata_smart_attributes: Option<AtaAttributeTable>,
}

#[derive(Debug, Deserialize)]
struct SmartStatus {
    passed: bool,
}

#[derive(Debug, Deserialize)]
struct Temperature {
    current: i64,
}

#[derive(Debug, Deserialize)]
struct PowerOnTime {
    hours: i64,
}

#[derive(Debug, Deserialize)]
struct AtaAttributeTable {
    #[serde(default)]
    table: Vec<AtaAttribute>,
}

#[derive(Debug, Deserialize)]
struct AtaAttribute {
    id: u16,
    name: String,
    value: i64,
    worst: i64,
    thresh: i64,
    #[serde(default)]
    when_failed: String,
    raw: RawValue,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    value: i64,
}

impl AtaAttribute {
    fn into_attribute(self) -> SmartAttribute {
        SmartAttribute {
            id: self.id,
            name: self.name,
            value: self.value,
            worst: self.worst,
            threshold: self.thresh,
            raw: self.raw.value,
            failed: !self.when_failed.is_empty(),
        }
    }
}

#[cfg(test)]
#[path = "smart_tests.rs"]
mod tests;
