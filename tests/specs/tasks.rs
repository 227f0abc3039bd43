// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle specs.

use crate::prelude::*;
use keel_core::OpState;
use keel_engine::TaskManager;
use serde_json::json;
use std::time::Duration;

/// A successful unit lands in DONE with progress 100 and its result
/// recorded; the in-memory entry is evicted so the second lookup hits
/// persistence.
#[tokio::test]
async fn successful_task_round_trip() {
    let rig = Rig::new();
    let manager = TaskManager::with_store(rig.tasks.clone()).await;

    let op = manager
        .submit("spec-success", |_cancel, progress| async move {
            progress.update(50).await;
            Ok(json!("ok"))
        })
        .await
        .unwrap();

    let done = manager.wait(&op.id, Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(done.state, OpState::Done);
    assert_eq!(done.progress, 100);
    assert_eq!(done.result, Some(json!("ok")));

    // eviction lands right after the final write
    for _ in 0..50 {
        if manager.count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(manager.count(), 0);
    let from_store = rig.tasks.get(&op.id).await.unwrap().unwrap();
    assert_eq!(from_store.state, OpState::Done);
}

/// A unit blocking on its scope lands in CANCELLED after `cancel`.
#[tokio::test]
async fn cancelled_task_round_trip() {
    let rig = Rig::new();
    let manager = TaskManager::with_store(rig.tasks.clone()).await;

    let op = manager
        .submit("spec-cancel", |cancel, _progress| async move {
            cancel.cancelled().await;
            Err("interrupted".into())
        })
        .await
        .unwrap();

    manager.cancel(&op.id).unwrap();
    let cancelled = manager.wait(&op.id, Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(cancelled.state, OpState::Cancelled);
}
