// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-facing pool and dataset operations.
//!
//! Thin wrappers over the `zpool`/`zfs` tools, shared by the scanners,
//! the snapshot scheduler, and the API layer. Dataset mutations publish
//! their events here so every caller gets them for free.

use keel_core::{Clock, EventData, Pool, SystemClock};
use keel_exec::{ExecError, Runner};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("parse {tool} output: {message}")]
    Parse { tool: &'static str, message: String },

    /// Destroying anything without an `@` would hit a dataset.
    #[error("not a snapshot name: {0:?}")]
    NotASnapshot(String),
}

/// Pool tool wrapper.
pub struct PoolManager<C: Clock = SystemClock> {
    runner: Arc<dyn Runner>,
    bus: Arc<EventBus<C>>,
}

impl<C: Clock> PoolManager<C> {
    pub fn new(runner: Arc<dyn Runner>, bus: Arc<EventBus<C>>) -> Self {
        Self { runner, bus }
    }

    /// Enumerate pools with capacity and health.
    pub async fn list_pools(&self, cancel: &CancellationToken) -> Result<Vec<Pool>, PoolError> {
        let out = self
            .runner
            .output(cancel, "zpool", &["list", "-Hp", "-o", "name,size,alloc,free,health"])
            .await?;
        parse_pool_list(&out)
    }

    /// Snapshot names directly under `dataset`, full `<dataset>@<sub>` form.
    pub async fn list_snapshots(
        &self,
        cancel: &CancellationToken,
        dataset: &str,
    ) -> Result<Vec<String>, PoolError> {
        let out = self
            .runner
            .output(cancel, "zfs", &["list", "-H", "-t", "snapshot", "-o", "name", "-d", "1", dataset])
            .await?;
        Ok(String::from_utf8_lossy(&out)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn create_snapshot(
        &self,
        cancel: &CancellationToken,
        dataset: &str,
        sub_name: &str,
    ) -> Result<(), PoolError> {
        let full = format!("{dataset}@{sub_name}");
        self.runner.run(cancel, "zfs", &["snapshot", &full]).await?;
        tracing::info!(snapshot = %full, "snapshot created");
        Ok(())
    }

    pub async fn destroy_snapshot(
        &self,
        cancel: &CancellationToken,
        full_name: &str,
    ) -> Result<(), PoolError> {
        if !full_name.contains('@') {
            return Err(PoolError::NotASnapshot(full_name.to_string()));
        }
        self.runner.run(cancel, "zfs", &["destroy", full_name]).await?;
        tracing::info!(snapshot = %full_name, "snapshot destroyed");
        Ok(())
    }

    pub async fn create_dataset(
        &self,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<(), PoolError> {
        self.runner.run(cancel, "zfs", &["create", "-p", name]).await?;
        self.bus.emit(EventData::DatasetCreated { name: name.to_string() });
        Ok(())
    }

    pub async fn destroy_dataset(
        &self,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<(), PoolError> {
        self.runner.run(cancel, "zfs", &["destroy", "-r", name]).await?;
        self.bus.emit(EventData::DatasetDestroyed { name: name.to_string() });
        Ok(())
    }
}

/// Parse `zpool list -Hp` tab-separated output.
fn parse_pool_list(out: &[u8]) -> Result<Vec<Pool>, PoolError> {
    let text = String::from_utf8_lossy(out);
    let mut pools = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [name, size, alloc, free, health] = fields[..] else {
            return Err(PoolError::Parse {
                tool: "zpool",
                message: format!("expected 5 fields, got {}: {line:?}", fields.len()),
            });
        };
        let parse_bytes = |field: &str, value: &str| {
            value.parse::<u64>().map_err(|_| PoolError::Parse {
                tool: "zpool",
                message: format!("bad {field} {value:?} for pool {name:?}"),
            })
        };
        pools.push(Pool {
            name: name.to_string(),
            size: parse_bytes("size", size)?,
            allocated: parse_bytes("alloc", alloc)?,
            free: parse_bytes("free", free)?,
            health: health.parse().map_err(|err| PoolError::Parse {
                tool: "zpool",
                message: format!("{err} for pool {name:?}"),
            })?,
        });
    }
    Ok(pools)
}

#[cfg(test)]
#[path = "pools_tests.rs"]
mod tests;
