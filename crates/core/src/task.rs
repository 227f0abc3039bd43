// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running operation records and their state machine.
//!
//! ```text
//! PENDING ──(run starts)──> RUNNING ──(work returns value)────> DONE
//!                                    ├─(work returns error)───> FAILED
//!                                    └─(cancel scope fired)───> CANCELLED
//! ```
//!
//! Terminal states are sinks. When the cancellation scope has fired by
//! completion time, `CANCELLED` wins regardless of what the work returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a submitted operation.
    pub struct OpId("op-");
}

/// Error recorded on operations interrupted by a daemon restart.
///
/// Work units are closures and cannot be resumed; recovery rewrites any
/// non-terminal record with this diagnostic.
pub const RESTART_FAILURE: &str = "task failed due to system restart";

/// Lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpState {
    Pending,
    Running,
    Done,
    Failed,
    Cancelled,
}

crate::simple_display! {
    OpState {
        Pending => "PENDING",
        Running => "RUNNING",
        Done => "DONE",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

impl OpState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// Persisted record of a long-running operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OpId,
    pub name: String,
    pub state: OpState,
    /// 0–100; forced to 100 on `DONE`.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    /// Fresh `PENDING` record for a just-submitted operation.
    pub fn pending(id: OpId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            state: OpState::Pending,
            progress: 0,
            metadata: None,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
