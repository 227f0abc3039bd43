// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool health scanner.
//!
//! Publishes `pool.degraded` for every non-ONLINE pool on every round,
//! and `pool.online` once when a previously unhealthy pool recovers.

use keel_core::{Clock, EventData};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;
use crate::monitor::{ScanError, Scanner};
use crate::pools::PoolManager;

pub struct PoolScanner<C: Clock> {
    pools: Arc<PoolManager<C>>,
    bus: Arc<EventBus<C>>,
    /// Pools last seen unhealthy, for recovery detection.
    unhealthy: Mutex<HashSet<String>>,
}

impl<C: Clock> PoolScanner<C> {
    pub fn new(pools: Arc<PoolManager<C>>, bus: Arc<EventBus<C>>) -> Self {
        Self { pools, bus, unhealthy: Mutex::new(HashSet::new()) }
    }
}

#[async_trait::async_trait]
impl<C: Clock + 'static> Scanner for PoolScanner<C> {
    fn name(&self) -> &'static str {
        "pools"
    }

    async fn scan(&self, cancel: &CancellationToken) -> Result<(), ScanError> {
        let pools = self.pools.list_pools(cancel).await?;

        let mut unhealthy = self.unhealthy.lock();
        let mut seen = HashSet::new();
        for pool in pools {
            seen.insert(pool.name.clone());
            if pool.health.is_healthy() {
                if unhealthy.remove(&pool.name) {
                    tracing::info!(pool = %pool.name, "pool recovered");
                    self.bus.emit(EventData::PoolOnline { pool });
                }
            } else {
                tracing::warn!(pool = %pool.name, health = %pool.health, "pool unhealthy");
                unhealthy.insert(pool.name.clone());
                self.bus.emit(EventData::PoolDegraded { pool });
            }
        }
        // forget pools that disappeared entirely
        unhealthy.retain(|name| seen.contains(name));
        Ok(())
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
