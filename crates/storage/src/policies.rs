// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot policy records.

use crate::StorageError;
use async_trait::async_trait;
use keel_core::SnapshotPolicy;
use parking_lot::Mutex;

/// Persistence for snapshot policies.
///
/// The scheduler consumes `list`; the mutation operations exist for the
/// API layer, which must call the scheduler's `reload` after using them.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn list(&self) -> Result<Vec<SnapshotPolicy>, StorageError>;

    async fn get(&self, id: i64) -> Result<Option<SnapshotPolicy>, StorageError>;

    /// Insert a policy, assigning its id. Names must match the policy
    /// name grammar and are unique.
    async fn create(&self, policy: &SnapshotPolicy) -> Result<SnapshotPolicy, StorageError>;

    /// Overwrite an existing policy. Renames obey the same grammar and
    /// uniqueness rules as `create`.
    async fn update(&self, policy: &SnapshotPolicy) -> Result<(), StorageError>;

    async fn delete(&self, id: i64) -> Result<(), StorageError>;
}

/// In-memory [`PolicyStore`] with monotonically assigned ids.
#[derive(Default)]
pub struct MemoryPolicyStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    policies: Vec<SnapshotPolicy>,
    next_id: i64,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn list(&self) -> Result<Vec<SnapshotPolicy>, StorageError> {
        Ok(self.inner.lock().policies.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<SnapshotPolicy>, StorageError> {
        Ok(self.inner.lock().policies.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, policy: &SnapshotPolicy) -> Result<SnapshotPolicy, StorageError> {
        SnapshotPolicy::validate_name(&policy.name)
            .map_err(|err| StorageError::invalid("policy", err))?;
        let mut inner = self.inner.lock();
        if inner.policies.iter().any(|p| p.name == policy.name) {
            return Err(StorageError::conflict("policy", &policy.name));
        }
        inner.next_id += 1;
        let mut stored = policy.clone();
        stored.id = inner.next_id;
        inner.policies.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, policy: &SnapshotPolicy) -> Result<(), StorageError> {
        SnapshotPolicy::validate_name(&policy.name)
            .map_err(|err| StorageError::invalid("policy", err))?;
        let mut inner = self.inner.lock();
        if inner.policies.iter().any(|p| p.name == policy.name && p.id != policy.id) {
            return Err(StorageError::conflict("policy", &policy.name));
        }
        let slot = inner
            .policies
            .iter_mut()
            .find(|p| p.id == policy.id)
            .ok_or_else(|| StorageError::not_found("policy", policy.id.to_string()))?;
        *slot = policy.clone();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        let before = inner.policies.len();
        inner.policies.retain(|p| p.id != id);
        if inner.policies.len() == before {
            return Err(StorageError::not_found("policy", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "policies_tests.rs"]
mod tests;
