// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real process execution via `tokio::process`.

use crate::{ExecError, Runner};
use async_trait::async_trait;
use std::process::Stdio;
use tokio_util::sync::CancellationToken;

/// Maximum bytes of stderr kept in an [`ExecError::Exit`].
const STDERR_SNIPPET_LIMIT: usize = 512;

/// [`Runner`] backed by real OS processes.
///
/// Children are spawned with `kill_on_drop`, so a fired cancellation
/// scope (or a dropped future) reaps the process.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<std::process::Output, ExecError> {
        let span = tracing::debug_span!("exec", cmd = %program, args = ?args);
        let _guard = span.enter();

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;

        // Dropping the wait future on cancellation kills the child via
        // kill_on_drop.
        let output = tokio::select! {
            output = child.wait_with_output() => {
                output.map_err(|source| ExecError::Spawn {
                    program: program.to_string(),
                    source,
                })?
            }
            _ = cancel.cancelled() => {
                tracing::debug!(cmd = %program, "command cancelled");
                return Err(ExecError::Cancelled { program: program.to_string() });
            }
        };

        if output.status.success() {
            return Ok(output);
        }
        match output.status.code() {
            Some(code) => Err(ExecError::Exit {
                program: program.to_string(),
                code,
                stderr: truncate_snippet(&output.stderr, STDERR_SNIPPET_LIMIT),
                stdout: output.stdout,
            }),
            None => Err(ExecError::Signalled { program: program.to_string() }),
        }
    }
}

#[async_trait]
impl Runner for SystemRunner {
    async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ExecError> {
        self.execute(cancel, program, args).await.map(|_| ())
    }

    async fn output(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError> {
        self.execute(cancel, program, args).await.map(|output| output.stdout)
    }

    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError> {
        self.execute(cancel, program, args).await.map(|output| {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);
            combined
        })
    }
}

/// Truncate a byte buffer to a UTF-8–safe snippet of at most `limit` bytes.
fn truncate_snippet(bytes: &[u8], limit: usize) -> String {
    let s = String::from_utf8_lossy(bytes);
    let s = s.trim_end();
    if s.len() <= limit {
        return s.to_string();
    }
    let mut end = limit.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
