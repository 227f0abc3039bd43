// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe hub.
//!
//! Delivery is lossy by contract: every subscriber gets a bounded
//! channel, and a publisher never waits for a slow consumer. Consumers
//! that need every event install a persister sink instead of (or next
//! to) a channel subscription.

use keel_core::{pattern_matches, Clock, Event, EventData, SystemClock};
use keel_storage::NotificationStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Per-subscriber channel capacity.
pub const SUBSCRIBE_BUFFER: usize = 16;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Event>,
}

/// A live subscription handed out by [`EventBus::subscribe`].
///
/// Dropping it without calling `unsubscribe` leaves a dead sender in the
/// bus until the next publish notices the closed channel; prefer
/// [`EventBus::unsubscribe`], which removes and closes in one step.
pub struct Subscription {
    pattern: String,
    id: u64,
    rx: mpsc::Receiver<Event>,
}

impl Subscription {
    /// Wait for the next matching event. Returns `None` once
    /// unsubscribed (channel closed) and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Concurrency-safe event hub with pattern subscriptions.
pub struct EventBus<C: Clock = SystemClock> {
    clock: C,
    subscribers: RwLock<HashMap<String, Vec<Subscriber>>>,
    persister: RwLock<Option<Arc<dyn NotificationStore>>>,
    next_id: AtomicU64,
}

impl EventBus<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for EventBus<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> EventBus<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            subscribers: RwLock::new(HashMap::new()),
            persister: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Install the durable sink, invoked once per published event.
    /// Sink failures are logged and never surface to publishers.
    pub fn set_persister(&self, sink: Arc<dyn NotificationStore>) {
        *self.persister.write() = Some(sink);
    }

    /// Register a new subscriber for `pattern`.
    ///
    /// Patterns: `"*"` (everything), `"prefix.*"` (one-level wildcard),
    /// or a literal kind. The same pattern may have many independent
    /// subscribers.
    pub fn subscribe(&self, pattern: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBE_BUFFER);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .write()
            .entry(pattern.to_string())
            .or_default()
            .push(Subscriber { id, tx });
        Subscription { pattern: pattern.to_string(), id, rx }
    }

    /// Remove a subscription and close its channel.
    ///
    /// Taking the subscription by value makes double-unsubscribe
    /// impossible; the sender is dropped under the write lock, so no
    /// publish can race the close.
    pub fn unsubscribe(&self, sub: Subscription) {
        let mut subscribers = self.subscribers.write();
        if let Some(list) = subscribers.get_mut(&sub.pattern) {
            list.retain(|s| s.id != sub.id);
            if list.is_empty() {
                subscribers.remove(&sub.pattern);
            }
        }
        // rx drops here; with the sender already removed the channel is
        // closed exactly once
    }

    /// Publish an event to every matching subscriber.
    ///
    /// Stamps `time` when zero. Delivery per subscriber is non-blocking:
    /// a full channel drops the event for that subscriber only.
    pub fn publish(&self, event: impl Into<Event>) {
        let mut event = event.into();
        if event.time == 0 {
            event.time = self.clock.epoch_ms();
        }

        {
            let subscribers = self.subscribers.read();
            for (pattern, list) in subscribers.iter() {
                if !pattern_matches(pattern, event.kind()) {
                    continue;
                }
                for subscriber in list {
                    match subscriber.tx.try_send(event.clone()) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            tracing::debug!(
                                kind = event.kind(),
                                pattern = %pattern,
                                "subscriber lagging, event dropped"
                            );
                        }
                        // Receiver dropped without unsubscribe; the entry
                        // is reaped on unsubscribe or bus teardown.
                        Err(mpsc::error::TrySendError::Closed(_)) => {}
                    }
                }
            }
        }

        let persister = self.persister.read().clone();
        if let Some(sink) = persister {
            tokio::spawn(async move {
                if let Err(err) = sink.save(&event).await {
                    tracing::warn!(%err, kind = event.kind(), "event persister failed");
                }
            });
        }
    }

    /// Convenience for payload-only publishing.
    pub fn emit(&self, data: EventData) {
        self.publish(Event::new(data));
    }

    /// Number of live subscriptions across all patterns.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().values().map(Vec::len).sum()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
