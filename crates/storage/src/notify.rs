// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable event history (the bus persister sink).
//!
//! Channel subscribers are lossy under backpressure; consumers that need
//! every event read them back from here instead.

use crate::StorageError;
use async_trait::async_trait;
use keel_core::Event;
use parking_lot::Mutex;

/// Persistence sink for published events.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn save(&self, event: &Event) -> Result<(), StorageError>;

    /// Most-recent-first slice of stored events.
    async fn list(&self, limit: usize) -> Result<Vec<Event>, StorageError>;
}

/// In-memory [`NotificationStore`].
#[derive(Default)]
pub struct MemoryNotificationStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    fail_writes: bool,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, for exercising the bus's
    /// persister error handling.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    pub fn count(&self) -> usize {
        self.inner.lock().events.len()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn save(&self, event: &Event) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(StorageError::Backend("write refused".into()));
        }
        inner.events.push(event.clone());
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Event>, StorageError> {
        Ok(self.inner.lock().events.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
