// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-cadence scanner loop.
//!
//! The monitor runs every scanner once at start, then again on each
//! tick, in declaration order. Rounds never overlap and a failing
//! scanner never stops its siblings or the loop.

use keel_exec::ExecError;
use keel_storage::StorageError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::pools::PoolError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("parse {tool} output: {message}")]
    Parse { tool: &'static str, message: String },

    #[error("scan cancelled")]
    Cancelled,
}

/// One reconciliation pass over some external observation.
#[async_trait::async_trait]
pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;

    /// A single scan round. Must honor the cancellation scope.
    async fn scan(&self, cancel: &CancellationToken) -> Result<(), ScanError>;
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives a fixed set of scanners on one cadence.
pub struct Monitor {
    scanners: Vec<Arc<dyn Scanner>>,
    interval: Duration,
    running: Mutex<Option<Running>>,
}

impl Monitor {
    pub fn new(interval: Duration, scanners: Vec<Arc<dyn Scanner>>) -> Self {
        Self { scanners, interval, running: Mutex::new(None) }
    }

    /// Start the loop under a scope derived from `parent`. Every
    /// scanner runs once immediately.
    pub fn start(&self, parent: &CancellationToken) {
        let mut running = self.running.lock();
        if running.is_some() {
            tracing::warn!("monitor already started");
            return;
        }

        let cancel = parent.child_token();
        let scanners = self.scanners.clone();
        let interval = self.interval;
        let loop_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            run_round(&scanners, &loop_cancel).await;

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately; the initial round
            // already covered it
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = ticker.tick() => run_round(&scanners, &loop_cancel).await,
                }
            }
        });

        *running = Some(Running { cancel, handle });
    }

    /// Cancel the derived scope and wait for the in-flight round.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().take() else { return };
        running.cancel.cancel();
        if running.handle.await.is_err() {
            tracing::warn!("monitor loop panicked");
        }
    }
}

/// One serial pass over all scanners. Failures are logged per scanner
/// and never abort the round.
async fn run_round(scanners: &[Arc<dyn Scanner>], cancel: &CancellationToken) {
    for scanner in scanners {
        if cancel.is_cancelled() {
            return;
        }
        if let Err(err) = scanner.scan(cancel).await {
            tracing::warn!(scanner = scanner.name(), %err, "scan failed");
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
