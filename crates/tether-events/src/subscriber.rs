//! Subscription bookkeeping for the event bus.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Callback invoked for each event delivered on a subscribed topic.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Token identifying one subscription.
///
/// Returned by [`on`](crate::EventBus::on)/[`once`](crate::EventBus::once)
/// and consumed by [`off`](crate::EventBus::off). Ids are unique for the
/// lifetime of the bus and never reused, so a stale token degrades to a
/// no-op rather than removing someone else's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// One registered handler on one topic.
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) handler: Handler,
    /// Dropped from the table after its first delivery.
    pub(crate) once: bool,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}
