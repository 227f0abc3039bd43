// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle management for long-running operations.
//!
//! A submitted work unit is an async closure
//! `(CancellationToken, ProgressHandle) -> Result<Value, Error>`. The
//! manager persists the record through
//! `PENDING -> RUNNING -> DONE | FAILED | CANCELLED`, evicts the
//! in-memory entry after the final write, and on startup fails over any
//! records a previous process left non-terminal — closures cannot be
//! resumed across a restart.

use chrono::Utc;
use keel_core::{OpId, OpState, Operation, RESTART_FAILURE};
use keel_storage::{StorageError, TaskStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// How many recent records the startup recovery pass examines.
pub const RECOVERY_BATCH: usize = 100;

/// Poll cadence of [`TaskManager::wait`].
const WAIT_POLL: Duration = Duration::from_millis(100);

/// Default [`TaskManager::wait`] timeout.
const WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// What a work unit returns.
pub type WorkOutput = Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("operation {0:?} not found")]
    NotFound(String),

    /// The entry exists but holds no live cancellation scope.
    #[error("operation {0:?} is not cancellable")]
    NotCancellable(String),

    #[error("timed out waiting for operation {0:?}")]
    WaitTimeout(String),

    #[error(transparent)]
    Persistence(#[from] StorageError),
}

struct TaskEntry {
    op: Operation,
    /// Held only while the task may still be cancelled.
    cancel: Option<CancellationToken>,
}

struct ManagerInner {
    tasks: Mutex<HashMap<OpId, TaskEntry>>,
    store: Option<Arc<dyn TaskStore>>,
    tracker: TaskTracker,
}

impl ManagerInner {
    /// Mutate the in-memory record and persist the snapshot best-effort.
    async fn checkpoint(&self, id: &OpId, mutate: impl FnOnce(&mut Operation)) {
        let snapshot = {
            let mut tasks = self.tasks.lock();
            let Some(entry) = tasks.get_mut(id) else { return };
            mutate(&mut entry.op);
            entry.op.updated_at = Utc::now();
            entry.op.clone()
        };
        if let Some(store) = &self.store {
            if let Err(err) = store.update(&snapshot).await {
                tracing::debug!(op = %id, %err, "operation checkpoint not persisted");
            }
        }
    }
}

/// Progress reporter handed to work units. Updates are best-effort: a
/// persistence failure is logged and the run continues.
#[derive(Clone)]
pub struct ProgressHandle {
    inner: Arc<ManagerInner>,
    id: OpId,
}

impl ProgressHandle {
    /// Report progress in percent; clamped to 0–100.
    pub async fn update(&self, percent: u8) {
        let percent = percent.min(100);
        self.inner.checkpoint(&self.id, |op| op.progress = percent).await;
    }
}

/// Submit/track/cancel/recover manager for long-running operations.
pub struct TaskManager {
    inner: Arc<ManagerInner>,
}

impl TaskManager {
    /// Manager without persistence: records live only in memory and
    /// vanish on completion.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                tasks: Mutex::new(HashMap::new()),
                store: None,
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Manager backed by a store. Runs the recovery pass: recent
    /// records still `PENDING` or `RUNNING` belong to a dead process
    /// and are rewritten as `FAILED`.
    pub async fn with_store(store: Arc<dyn TaskStore>) -> Self {
        recover(store.as_ref()).await;
        Self {
            inner: Arc::new(ManagerInner {
                tasks: Mutex::new(HashMap::new()),
                store: Some(store),
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Submit a work unit. Persists a `PENDING` record, spawns the run,
    /// and returns immediately. A persistence failure fails the submit
    /// and releases the cancellation scope.
    pub async fn submit<F, Fut>(&self, name: &str, work: F) -> Result<Operation, TaskError>
    where
        F: FnOnce(CancellationToken, ProgressHandle) -> Fut + Send + 'static,
        Fut: Future<Output = WorkOutput> + Send + 'static,
    {
        let op = Operation::pending(OpId::new(), name);
        if let Some(store) = &self.inner.store {
            store.save(&op).await?;
        }

        let cancel = CancellationToken::new();
        self.inner.tasks.lock().insert(
            op.id,
            TaskEntry { op: op.clone(), cancel: Some(cancel.clone()) },
        );

        let inner = self.inner.clone();
        let id = op.id;
        self.inner.tracker.spawn(async move {
            inner.checkpoint(&id, |op| op.state = OpState::Running).await;

            let progress = ProgressHandle { inner: inner.clone(), id };
            let outcome = work(cancel.clone(), progress).await;

            finalize(&inner, id, cancel.is_cancelled(), outcome).await;
        });

        Ok(op)
    }

    /// Look up an operation: in-memory first, then the store.
    pub async fn get(&self, id: &str) -> Result<Option<Operation>, TaskError> {
        if let Some(entry) = self.inner.tasks.lock().get(id) {
            return Ok(Some(entry.op.clone()));
        }
        match &self.inner.store {
            Some(store) => Ok(store.get(id).await?),
            None => Ok(None),
        }
    }

    /// Most-recent-first page of operations.
    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Operation>, TaskError> {
        if let Some(store) = &self.inner.store {
            return Ok(store.list(limit, offset).await?);
        }
        let mut ops: Vec<Operation> =
            self.inner.tasks.lock().values().map(|e| e.op.clone()).collect();
        ops.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ops.into_iter().skip(offset).take(limit).collect())
    }

    /// Trigger the cancellation scope of a live operation.
    pub fn cancel(&self, id: &str) -> Result<(), TaskError> {
        let tasks = self.inner.tasks.lock();
        let entry = tasks.get(id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        match &entry.cancel {
            Some(token) => {
                token.cancel();
                Ok(())
            }
            None => Err(TaskError::NotCancellable(id.to_string())),
        }
    }

    /// Poll until the operation reaches a terminal state or the timeout
    /// (default 5 minutes) expires.
    pub async fn wait(&self, id: &str, timeout: Option<Duration>) -> Result<Operation, TaskError> {
        let deadline = tokio::time::Instant::now() + timeout.unwrap_or(WAIT_TIMEOUT);
        loop {
            let op = self.get(id).await?.ok_or_else(|| TaskError::NotFound(id.to_string()))?;
            if op.state.is_terminal() {
                return Ok(op);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(TaskError::WaitTimeout(id.to_string()));
            }
            tokio::time::sleep(WAIT_POLL).await;
        }
    }

    /// Number of in-memory entries.
    pub fn count(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// In-memory entries still `PENDING` or `RUNNING`.
    pub fn list_active(&self) -> Vec<Operation> {
        let mut active: Vec<Operation> = self
            .inner
            .tasks
            .lock()
            .values()
            .filter(|e| e.op.state.is_active())
            .map(|e| e.op.clone())
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        active
    }

    /// Remove an in-memory entry.
    pub fn delete(&self, id: &str) -> Result<(), TaskError> {
        match self.inner.tasks.lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(TaskError::NotFound(id.to_string())),
        }
    }

    /// Wait for all running tasks to finish. No new submits afterwards.
    pub async fn close(&self) {
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the terminal record and evict the in-memory entry.
///
/// A cancellation scope that fired by completion time wins over the
/// work's own outcome.
async fn finalize(inner: &ManagerInner, id: OpId, cancelled: bool, outcome: WorkOutput) {
    let snapshot = {
        let mut tasks = inner.tasks.lock();
        let Some(entry) = tasks.get_mut(&id) else { return };
        let op = &mut entry.op;
        if cancelled {
            op.state = OpState::Cancelled;
            op.error = Some(match outcome {
                Err(err) => err.to_string(),
                Ok(_) => "task cancelled".to_string(),
            });
        } else {
            match outcome {
                Ok(result) => {
                    op.state = OpState::Done;
                    op.progress = 100;
                    op.result = Some(result);
                }
                Err(err) => {
                    op.state = OpState::Failed;
                    op.error = Some(err.to_string());
                }
            }
        }
        op.updated_at = Utc::now();
        entry.cancel = None;
        op.clone()
    };

    if let Some(store) = &inner.store {
        if let Err(err) = store.update(&snapshot).await {
            tracing::warn!(op = %id, %err, "terminal state not persisted");
        }
    }

    inner.tasks.lock().remove(&id);
    tracing::debug!(op = %id, state = %snapshot.state, "operation finished");
}

/// Fail over whatever a previous process left unfinished.
async fn recover(store: &dyn TaskStore) {
    let batch = match store.list(RECOVERY_BATCH, 0).await {
        Ok(batch) => batch,
        Err(err) => {
            tracing::warn!(%err, "task recovery scan failed");
            return;
        }
    };
    for mut op in batch {
        if op.state.is_terminal() {
            continue;
        }
        op.state = OpState::Failed;
        op.error = Some(RESTART_FAILURE.to_string());
        op.updated_at = Utc::now();
        if let Err(err) = store.update(&op).await {
            tracing::warn!(op = %op.id, %err, "task recovery update failed");
        } else {
            tracing::info!(op = %op.id, name = %op.name, "failed interrupted task");
        }
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
