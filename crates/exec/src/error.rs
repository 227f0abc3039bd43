// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for command execution.

use thiserror::Error;

/// Failure modes of an external command.
///
/// Non-zero exits keep the captured output: tools like the health probe
/// encode diagnostics in exit-status bits while still printing a usable
/// report, and only the caller knows which bits are fatal.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero.
    #[error("{program} exited with code {code}: {stderr}")]
    Exit {
        program: String,
        code: i32,
        /// Captured stdout, still valid for tools whose exit bits are
        /// informational.
        stdout: Vec<u8>,
        /// Truncated stderr snippet for diagnostics.
        stderr: String,
    },

    /// The program was terminated by a signal, so no exit code exists.
    #[error("{program} terminated by signal")]
    Signalled { program: String },

    /// The cancellation scope fired before the program finished.
    #[error("{program} cancelled")]
    Cancelled { program: String },
}

impl ExecError {
    /// The numeric exit code, when the failure is a non-zero exit.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Captured stdout of a non-zero exit, when present.
    pub fn exit_stdout(&self) -> Option<&[u8]> {
        match self {
            Self::Exit { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
