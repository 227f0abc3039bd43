// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation records.

use crate::StorageError;
use async_trait::async_trait;
use keel_core::Operation;
use parking_lot::Mutex;

/// Persistence for task lifecycle records.
///
/// Records live forever; the task manager evicts its in-memory entries
/// after the final write and serves history from here.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a fresh record. Fails on duplicate id.
    async fn save(&self, op: &Operation) -> Result<(), StorageError>;

    /// Overwrite an existing record.
    async fn update(&self, op: &Operation) -> Result<(), StorageError>;

    async fn get(&self, id: &str) -> Result<Option<Operation>, StorageError>;

    /// Most-recent-first page of records.
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Operation>, StorageError>;
}

/// In-memory [`TaskStore`], insertion-ordered.
#[derive(Default)]
pub struct MemoryTaskStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    ops: Vec<Operation>,
    fail_writes: bool,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for exercising persistence
    /// error paths.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    fn check_writable(inner: &Inner) -> Result<(), StorageError> {
        if inner.fail_writes {
            Err(StorageError::Backend("write refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn save(&self, op: &Operation) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        Self::check_writable(&inner)?;
        if inner.ops.iter().any(|existing| existing.id == op.id) {
            return Err(StorageError::conflict("operation", op.id.as_str()));
        }
        inner.ops.push(op.clone());
        Ok(())
    }

    async fn update(&self, op: &Operation) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        Self::check_writable(&inner)?;
        let slot = inner
            .ops
            .iter_mut()
            .find(|existing| existing.id == op.id)
            .ok_or_else(|| StorageError::not_found("operation", op.id.as_str()))?;
        *slot = op.clone();
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Operation>, StorageError> {
        Ok(self.inner.lock().ops.iter().find(|op| op.id == *id).cloned())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Operation>, StorageError> {
        let inner = self.inner.lock();
        Ok(inner.ops.iter().rev().skip(offset).take(limit).cloned().collect())
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
