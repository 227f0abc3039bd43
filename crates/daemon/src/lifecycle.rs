// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, wiring, and ordered shutdown.

use fs2::FileExt;
use keel_engine::{
    DiskScanner, EventBus, Monitor, PoolManager, PoolScanner, Scanner, SmartScanner,
    SnapshotScheduler, TaskManager,
};
use keel_exec::SystemRunner;
use keel_storage::{
    MemoryDiskStore, MemoryNotificationStore, MemoryPolicyStore, MemoryTaskStore,
};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ConfigError};
use crate::env;

const LOCK_FILE: &str = "keeld.lock";

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot determine state directory (set KEEL_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("another keeld is already running in this state directory")]
    AlreadyRunning,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] keel_engine::ScheduleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Run the daemon until a shutdown signal arrives.
pub async fn run() -> Result<(), LifecycleError> {
    let state_dir = env::state_dir()?;
    std::fs::create_dir_all(&state_dir)?;
    let _lock = acquire_lock(&state_dir)?;

    let _log_guard = init_tracing(&state_dir);
    let config = Config::load(&state_dir)?;
    tracing::info!(state_dir = %state_dir.display(), "keeld starting");

    // Stores are in-memory for now; a relational backend plugs in
    // behind the same traits.
    let runner = Arc::new(SystemRunner::new());
    let disks = Arc::new(MemoryDiskStore::new());
    let tasks_store = Arc::new(MemoryTaskStore::new());
    let policies = Arc::new(MemoryPolicyStore::new());
    let notifications = Arc::new(MemoryNotificationStore::new());

    let bus = Arc::new(EventBus::new());
    bus.set_persister(notifications);

    let tasks = TaskManager::with_store(tasks_store).await;

    let pools = Arc::new(PoolManager::new(runner.clone(), bus.clone()));
    let scanners: Vec<Arc<dyn Scanner>> = vec![
        Arc::new(
            DiskScanner::new(runner.clone(), disks.clone(), bus.clone())
                .include_loop_devices(config.disks.scan_loop_devices),
        ),
        Arc::new(SmartScanner::new(
            runner.clone(),
            disks,
            bus.clone(),
            keel_core::SystemClock,
            config.smart_interval(),
        )),
        Arc::new(PoolScanner::new(pools.clone(), bus.clone())),
    ];
    let monitor = Monitor::new(config.monitor_interval(), scanners);
    let scheduler = SnapshotScheduler::new(policies, pools);

    let root = CancellationToken::new();
    monitor.start(&root);
    scheduler.start(&root).await?;
    tracing::info!("keeld running");

    shutdown_signal().await;
    tracing::info!("shutdown requested");

    scheduler.stop().await;
    monitor.stop().await;
    tasks.close().await;
    root.cancel();
    tracing::info!("keeld stopped");
    Ok(())
}

/// One daemon per state dir, enforced with an advisory file lock held
/// for the process lifetime.
fn acquire_lock(state_dir: &Path) -> Result<File, LifecycleError> {
    let file = File::create(state_dir.join(LOCK_FILE))?;
    file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning)?;
    Ok(file)
}

/// Log to a daily-rotated file under the state dir; level via KEEL_LOG.
fn init_tracing(state_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let appender = tracing_appender::rolling::daily(state_dir.join("logs"), "keeld.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env::log_filter()))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(err) => {
                tracing::warn!(%err, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
