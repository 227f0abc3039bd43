// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::EventData;

fn dataset_event(name: &str) -> Event {
    Event::new(EventData::DatasetCreated { name: name.into() })
}

#[tokio::test]
async fn saves_and_lists_most_recent_first() {
    let store = MemoryNotificationStore::new();
    store.save(&dataset_event("tank/a")).await.unwrap();
    store.save(&dataset_event("tank/b")).await.unwrap();
    store.save(&dataset_event("tank/c")).await.unwrap();

    let names: Vec<String> = store
        .list(2)
        .await
        .unwrap()
        .into_iter()
        .map(|e| match e.data {
            EventData::DatasetCreated { name } => name,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(names, vec!["tank/c", "tank/b"]);
    assert_eq!(store.count(), 3);
}

#[tokio::test]
async fn fail_writes_surfaces_backend_error() {
    let store = MemoryNotificationStore::new();
    store.fail_writes(true);
    assert!(matches!(
        store.save(&dataset_event("tank/a")).await.unwrap_err(),
        StorageError::Backend(_)
    ));
    assert_eq!(store.count(), 0);
}
