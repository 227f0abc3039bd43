// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage layer errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("{kind} {id:?} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id:?} already exists")]
    Conflict { kind: &'static str, id: String },

    /// A record rejected at entry, before anything is written.
    #[error("invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },

    /// Backend failure (connection lost, write failed, ...).
    #[error("storage backend: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn conflict(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Conflict { kind, id: id.into() }
    }

    pub fn invalid(kind: &'static str, message: impl ToString) -> Self {
        Self::Invalid { kind, message: message.to_string() }
    }
}
