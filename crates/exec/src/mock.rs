// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording mock runner for tests.
//!
//! Records every call as `(program, args)` and replays configured
//! responses per program name: one-shot queued responses first, then a
//! sticky default. Unconfigured programs error, so a test cannot
//! silently exercise a tool it forgot to script.

use crate::{ExecError, Runner};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
enum Response {
    Output(Vec<u8>),
    Exit { code: i32, stdout: Vec<u8>, stderr: String },
    SpawnFailure,
}

impl Response {
    fn into_result(self, program: &str) -> Result<Vec<u8>, ExecError> {
        match self {
            Self::Output(bytes) => Ok(bytes),
            Self::Exit { code, stdout, stderr } => Err(ExecError::Exit {
                program: program.to_string(),
                code,
                stdout,
                stderr,
            }),
            Self::SpawnFailure => Err(ExecError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock spawn failure"),
            }),
        }
    }
}

#[derive(Default)]
struct Inner {
    calls: Vec<RecordedCall>,
    queued: HashMap<String, VecDeque<Response>>,
    sticky: HashMap<String, Response>,
}

/// Thread-safe recording [`Runner`] double.
#[derive(Clone, Default)]
pub struct MockRunner {
    inner: Arc<Mutex<Inner>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sticky stdout for every call to `program`.
    pub fn set_output(&self, program: &str, stdout: impl Into<Vec<u8>>) {
        self.inner.lock().sticky.insert(program.to_string(), Response::Output(stdout.into()));
    }

    /// Sticky non-zero exit for every call to `program`.
    pub fn set_exit(&self, program: &str, code: i32, stdout: impl Into<Vec<u8>>, stderr: &str) {
        self.inner.lock().sticky.insert(
            program.to_string(),
            Response::Exit { code, stdout: stdout.into(), stderr: stderr.to_string() },
        );
    }

    /// Sticky spawn failure for every call to `program`.
    pub fn set_spawn_failure(&self, program: &str) {
        self.inner.lock().sticky.insert(program.to_string(), Response::SpawnFailure);
    }

    /// Queue a one-shot stdout consumed before the sticky response.
    pub fn push_output(&self, program: &str, stdout: impl Into<Vec<u8>>) {
        self.inner
            .lock()
            .queued
            .entry(program.to_string())
            .or_default()
            .push_back(Response::Output(stdout.into()));
    }

    /// Queue a one-shot non-zero exit.
    pub fn push_exit(&self, program: &str, code: i32, stdout: impl Into<Vec<u8>>, stderr: &str) {
        self.inner.lock().queued.entry(program.to_string()).or_default().push_back(
            Response::Exit { code, stdout: stdout.into(), stderr: stderr.to_string() },
        );
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    /// Recorded calls to one program.
    pub fn calls_for(&self, program: &str) -> Vec<RecordedCall> {
        self.inner.lock().calls.iter().filter(|c| c.program == program).cloned().collect()
    }

    /// Drop recorded calls and configured responses.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.calls.clear();
        inner.queued.clear();
        inner.sticky.clear();
    }

    fn respond(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });

        if cancel.is_cancelled() {
            return Err(ExecError::Cancelled { program: program.to_string() });
        }

        let queued = inner.queued.get_mut(program).and_then(VecDeque::pop_front);
        let response = queued.or_else(|| inner.sticky.get(program).cloned());
        match response {
            Some(response) => response.into_result(program),
            None => Err(ExecError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no mock response configured",
                ),
            }),
        }
    }
}

#[async_trait]
impl Runner for MockRunner {
    async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ExecError> {
        self.respond(cancel, program, args).map(|_| ())
    }

    async fn output(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError> {
        self.respond(cancel, program, args)
    }

    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError> {
        self.respond(cancel, program, args)
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
