// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`Runner`] trait and exit-code classification helpers.

use crate::ExecError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Exit-status bits of the SMART probe tool that mean the command itself
/// failed (command line error, device open failed, command failed).
/// Higher bits report disk prefail/failure conditions and leave the
/// report output intact.
pub const SMART_EXIT_FATAL: i32 = 0b0000_0111;

/// True when a probe exit code carries any fatal bit.
pub fn smart_exit_fatal(code: i32) -> bool {
    code & SMART_EXIT_FATAL != 0
}

/// Execute external programs under a cancellation scope.
///
/// A fired token terminates the child and yields
/// [`ExecError::Cancelled`]. Implementations must be cheap to clone
/// behind an `Arc` and safe to call concurrently.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run to completion, discarding output.
    async fn run(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<(), ExecError>;

    /// Run and capture standard output.
    async fn output(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError>;

    /// Run and capture standard output followed by standard error.
    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        program: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, ExecError>;
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
