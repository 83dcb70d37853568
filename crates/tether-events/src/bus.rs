//! Topic-keyed event bus with tracked subscriptions.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, trace};

use crate::subscriber::{Handler, Subscription, SubscriptionId};

/// Synchronous topic bus.
///
/// Handlers run on the emitting thread, in registration order per topic.
/// Cloning the bus shares the underlying subscriber table, so a clone
/// handed to another component observes — and can remove — the same
/// subscriptions.
///
/// The subscriber table lock is never held across a handler call, so
/// handlers are free to subscribe, unsubscribe, or emit again.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    topics: RwLock<HashMap<String, Vec<Subscription>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to every event emitted on `topic`.
    pub fn on(&self, topic: impl Into<String>, handler: Handler) -> SubscriptionId {
        self.subscribe(topic.into(), handler, false)
    }

    /// Subscribe for a single delivery.
    ///
    /// The subscription is dropped from the table before its handler
    /// runs, so a reentrant emit from inside the handler cannot fire it
    /// twice.
    pub fn once(&self, topic: impl Into<String>, handler: Handler) -> SubscriptionId {
        self.subscribe(topic.into(), handler, true)
    }

    fn subscribe(&self, topic: String, handler: Handler, once: bool) -> SubscriptionId {
        let id = SubscriptionId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut topics = self
            .inner
            .topics
            .write()
            .expect("bus subscriber table poisoned");
        trace!(%topic, subscription_id = %id, once, "Subscribed");
        topics
            .entry(topic)
            .or_default()
            .push(Subscription { id, handler, once });
        id
    }

    /// Remove a subscription.
    ///
    /// Unknown and already-removed ids are a no-op — a `once`
    /// subscription that fired, or a disposer replayed against a dead
    /// token, falls through harmlessly.
    pub fn off(&self, id: SubscriptionId) {
        let mut topics = self
            .inner
            .topics
            .write()
            .expect("bus subscriber table poisoned");
        for subs in topics.values_mut() {
            if let Some(pos) = subs.iter().position(|s| s.id == id) {
                subs.remove(pos);
                trace!(subscription_id = %id, "Unsubscribed");
                break;
            }
        }
        topics.retain(|_, subs| !subs.is_empty());
    }

    /// Emit `payload` to every handler subscribed to `topic`.
    ///
    /// Returns the number of handlers invoked. Handlers run in
    /// registration order; `once` subscriptions are removed from the
    /// table first, then invoked.
    pub fn emit(&self, topic: &str, payload: &Value) -> usize {
        let batch: Vec<Handler> = {
            let mut topics = self
                .inner
                .topics
                .write()
                .expect("bus subscriber table poisoned");
            let Some(subs) = topics.get_mut(topic) else {
                trace!(%topic, "No subscribers");
                return 0;
            };
            let batch = subs.iter().map(|s| Arc::clone(&s.handler)).collect();
            subs.retain(|s| !s.once);
            if subs.is_empty() {
                topics.remove(topic);
            }
            batch
        };
        for handler in &batch {
            handler(payload);
        }
        debug!(%topic, delivered = batch.len(), "Event emitted");
        batch.len()
    }

    /// Number of live subscriptions on `topic`.
    #[must_use]
    pub fn handler_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .read()
            .expect("bus subscriber table poisoned")
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// True when no topic has a live subscription.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner
            .topics
            .read()
            .expect("bus subscriber table poisoned")
            .is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self
            .inner
            .topics
            .read()
            .expect("bus subscriber table poisoned");
        f.debug_struct("EventBus")
            .field("topic_count", &topics.len())
            .field(
                "subscription_count",
                &topics.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}
