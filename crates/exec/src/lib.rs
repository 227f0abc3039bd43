// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keel-exec: external command execution under a cancellation scope.
//!
//! Everything in keel that touches the outside world (`lsblk`,
//! `smartctl`, `zpool`, `zfs`) goes through the [`Runner`] trait, so the
//! engine can be driven end-to-end against the recording [`MockRunner`].

mod error;
mod runner;
mod system;

#[cfg(any(test, feature = "test-support"))]
mod mock;

pub use error::ExecError;
pub use runner::{smart_exit_fatal, Runner, SMART_EXIT_FATAL};
pub use system::SystemRunner;

#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockRunner, RecordedCall};
