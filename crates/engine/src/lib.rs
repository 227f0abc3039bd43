// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keel-engine: the appliance's reconciliation and scheduling core.
//!
//! Components: the in-process [`EventBus`], the [`TaskManager`] for
//! long-running operations, the [`Monitor`] driving hardware/pool
//! [`Scanner`]s, the [`PoolManager`] wrapping the external pool tools,
//! and the [`SnapshotScheduler`].

pub mod bus;
pub mod monitor;
pub mod pools;
pub mod scanners;
pub mod scheduler;
pub mod tasks;

pub use bus::{EventBus, Subscription, SUBSCRIBE_BUFFER};
pub use monitor::{Monitor, ScanError, Scanner};
pub use pools::{PoolError, PoolManager};
pub use scanners::{DiskScanner, PoolScanner, SmartScanner};
pub use scheduler::{ScheduleError, SnapshotScheduler, RETENTION_SWEEP_SCHEDULE};
pub use tasks::{ProgressHandle, TaskError, TaskManager, WorkOutput, RECOVERY_BATCH};
