// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared rig for scenario specs.

use keel_core::SystemClock;
use keel_engine::{DiskScanner, EventBus, PoolManager, SmartScanner, SnapshotScheduler};
use keel_exec::MockRunner;
use keel_storage::{MemoryDiskStore, MemoryPolicyStore, MemoryTaskStore};
pub use keel_storage::{DiskStore, PolicyStore, TaskStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The daemon's engine wiring, backed by memory stores and the
/// recording runner.
pub struct Rig {
    pub runner: Arc<MockRunner>,
    pub disks: Arc<MemoryDiskStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub policies: Arc<MemoryPolicyStore>,
    pub bus: Arc<EventBus>,
    pub pools: Arc<PoolManager>,
}

impl Rig {
    pub fn new() -> Self {
        let runner = Arc::new(MockRunner::new());
        let bus = Arc::new(EventBus::new());
        let pools = Arc::new(PoolManager::new(runner.clone(), bus.clone()));
        Self {
            runner,
            disks: Arc::new(MemoryDiskStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
            policies: Arc::new(MemoryPolicyStore::new()),
            bus,
            pools,
        }
    }

    pub fn disk_scanner(&self) -> DiskScanner<SystemClock> {
        DiskScanner::new(self.runner.clone(), self.disks.clone(), self.bus.clone())
    }

    pub fn smart_scanner(&self, interval: Duration) -> SmartScanner<SystemClock> {
        SmartScanner::new(
            self.runner.clone(),
            self.disks.clone(),
            self.bus.clone(),
            SystemClock,
            interval,
        )
    }

    pub fn scheduler(&self) -> SnapshotScheduler {
        SnapshotScheduler::new(self.policies.clone(), self.pools.clone())
    }
}

pub fn token() -> CancellationToken {
    CancellationToken::new()
}
