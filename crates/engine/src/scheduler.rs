// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron-driven snapshot policy scheduler.
//!
//! Each enabled policy gets one entry task that sleeps until the next
//! cron firing and then creates `auto-<policy>-<timestamp>` snapshots
//! across the policy's datasets. A fixed hourly entry sweeps expired
//! automatic snapshots per retention. `reload` rebuilds the policy
//! entries (not the sweep) after policies change.

use chrono::Utc;
use cron::Schedule;
use keel_core::{
    auto_snapshot_name, normalize_schedule, parse_auto_snapshot, split_snapshot, Clock,
    SnapshotPolicy, SystemClock,
};
use keel_storage::{PolicyStore, StorageError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::pools::PoolManager;

/// Six-field cron line for the retention sweep: every hour at second 0.
pub const RETENTION_SWEEP_SCHEDULE: &str = "0 0 * * * *";

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

struct State {
    root: Option<CancellationToken>,
    tracker: TaskTracker,
    /// Live policy entries, policy id to entry scope.
    entries: HashMap<i64, CancellationToken>,
}

/// Drives automatic snapshot creation and retention cleanup.
pub struct SnapshotScheduler<C: Clock = SystemClock> {
    policies: Arc<dyn PolicyStore>,
    pools: Arc<PoolManager<C>>,
    state: Mutex<State>,
}

impl<C: Clock + 'static> SnapshotScheduler<C> {
    pub fn new(policies: Arc<dyn PolicyStore>, pools: Arc<PoolManager<C>>) -> Self {
        Self {
            policies,
            pools,
            state: Mutex::new(State {
                root: None,
                tracker: TaskTracker::new(),
                entries: HashMap::new(),
            }),
        }
    }

    /// Load policies and start the cron entries plus the retention
    /// sweep. Policies with unparseable schedules are logged and
    /// skipped; they never abort the start.
    pub async fn start(&self, parent: &CancellationToken) -> Result<(), ScheduleError> {
        let policies = self.policies.list().await?;

        let mut state = self.state.lock();
        if state.root.is_some() {
            tracing::warn!("snapshot scheduler already started");
            return Ok(());
        }
        let root = parent.child_token();
        state.tracker = TaskTracker::new();

        let Ok(sweep) = Schedule::from_str(RETENTION_SWEEP_SCHEDULE) else {
            unreachable!("fixed sweep schedule parses");
        };
        state.tracker.spawn(run_sweep_entry(
            self.policies.clone(),
            self.pools.clone(),
            sweep,
            root.child_token(),
        ));

        for policy in policies.into_iter().filter(|p| p.enabled) {
            self.schedule_policy(&mut state, &root, policy);
        }
        state.root = Some(root);
        Ok(())
    }

    /// Drop all policy entries, reread the store, and reschedule the
    /// enabled policies. The retention sweep keeps running. Call after
    /// creating, updating, or deleting a policy.
    pub async fn reload(&self) -> Result<(), ScheduleError> {
        let policies = self.policies.list().await?;

        let mut state = self.state.lock();
        let Some(root) = state.root.clone() else {
            return Ok(());
        };
        for (_, entry) in state.entries.drain() {
            entry.cancel();
        }
        for policy in policies.into_iter().filter(|p| p.enabled) {
            self.schedule_policy(&mut state, &root, policy);
        }
        tracing::info!(entries = state.entries.len(), "snapshot schedule reloaded");
        Ok(())
    }

    /// Halt the cron entries and wait for in-flight firings.
    pub async fn stop(&self) {
        let (root, tracker) = {
            let mut state = self.state.lock();
            let Some(root) = state.root.take() else { return };
            state.entries.clear();
            (root, std::mem::replace(&mut state.tracker, TaskTracker::new()))
        };
        root.cancel();
        tracker.close();
        tracker.wait().await;
    }

    /// Policy ids with a live cron entry, sorted.
    pub fn scheduled_policy_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.state.lock().entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Create this policy's snapshots now, as its cron entry would.
    pub async fn fire_policy(&self, cancel: &CancellationToken, policy: &SnapshotPolicy) {
        fire(&self.pools, policy, cancel).await;
    }

    /// Run one retention sweep pass now, as the hourly entry would.
    pub async fn run_retention_sweep(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), ScheduleError> {
        sweep(self.policies.as_ref(), &self.pools, cancel).await
    }

    fn schedule_policy(&self, state: &mut State, root: &CancellationToken, policy: SnapshotPolicy) {
        let normalized = normalize_schedule(&policy.schedule);
        let schedule = match Schedule::from_str(&normalized) {
            Ok(schedule) => schedule,
            Err(err) => {
                tracing::warn!(
                    policy = %policy.name,
                    schedule = %policy.schedule,
                    %err,
                    "invalid schedule, policy skipped"
                );
                return;
            }
        };
        let entry = root.child_token();
        state.entries.insert(policy.id, entry.clone());
        state.tracker.spawn(run_policy_entry(self.pools.clone(), policy, schedule, entry));
    }
}

/// Sleep until the schedule's next firing; `None` when the schedule has
/// no future firings.
fn next_delay(schedule: &Schedule) -> Option<Duration> {
    let next = schedule.upcoming(Utc).next()?;
    Some((next - Utc::now()).to_std().unwrap_or(Duration::ZERO))
}

async fn run_policy_entry<C: Clock>(
    pools: Arc<PoolManager<C>>,
    policy: SnapshotPolicy,
    schedule: Schedule,
    cancel: CancellationToken,
) {
    while let Some(delay) = next_delay(&schedule) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => fire(&pools, &policy, &cancel).await,
        }
    }
}

async fn run_sweep_entry<C: Clock>(
    policies: Arc<dyn PolicyStore>,
    pools: Arc<PoolManager<C>>,
    schedule: Schedule,
    cancel: CancellationToken,
) {
    while let Some(delay) = next_delay(&schedule) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {
                if let Err(err) = sweep(policies.as_ref(), &pools, &cancel).await {
                    tracing::warn!(%err, "retention sweep failed");
                }
            }
        }
    }
}

/// One firing: a shared timestamped name, one snapshot per dataset.
/// Per-dataset failures are logged and do not stop the rest.
async fn fire<C: Clock>(
    pools: &PoolManager<C>,
    policy: &SnapshotPolicy,
    cancel: &CancellationToken,
) {
    let name = auto_snapshot_name(&policy.name, Utc::now());
    tracing::debug!(policy = %policy.name, snapshot = %name, "policy fired");
    for dataset in &policy.datasets {
        if let Err(err) = pools.create_snapshot(cancel, dataset, &name).await {
            tracing::warn!(
                policy = %policy.name,
                dataset = %dataset,
                %err,
                "scheduled snapshot failed"
            );
        }
    }
}

/// One retention pass over every enabled policy with a finite window.
///
/// Only snapshots matching `auto-<policy>-<timestamp>` are candidates;
/// unparseable or foreign names are skipped, never destroyed.
async fn sweep<C: Clock>(
    policies: &dyn PolicyStore,
    pools: &PoolManager<C>,
    cancel: &CancellationToken,
) -> Result<(), ScheduleError> {
    for policy in policies.list().await?.into_iter().filter(|p| p.enabled) {
        let Some(window) = policy.retention.window() else { continue };
        let Ok(window) = chrono::Duration::from_std(window) else { continue };
        let now = Utc::now();

        for dataset in &policy.datasets {
            let snapshots = match pools.list_snapshots(cancel, dataset).await {
                Ok(snapshots) => snapshots,
                Err(err) => {
                    tracing::warn!(dataset = %dataset, %err, "snapshot listing failed");
                    continue;
                }
            };
            for full in snapshots {
                let Some((_, sub_name)) = split_snapshot(&full) else { continue };
                let Some(created) = parse_auto_snapshot(sub_name, &policy.name) else {
                    continue;
                };
                if now.signed_duration_since(created) < window {
                    continue;
                }
                match pools.destroy_snapshot(cancel, &full).await {
                    Ok(()) => {
                        tracing::info!(
                            snapshot = %full,
                            policy = %policy.name,
                            "expired snapshot destroyed"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(snapshot = %full, %err, "snapshot destroy failed");
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
