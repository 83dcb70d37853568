//! Timer scheduling port and the Tokio-backed implementation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

/// Repeating timer callback.
pub type IntervalFn = Box<dyn FnMut() + Send>;

/// One-shot timer callback.
pub type OneShotFn = Box<dyn FnOnce() + Send>;

/// Opaque handle identifying one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Mint an id. [`TimerService`] implementations assign ids;
    /// uniqueness within one service is their contract.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Scheduling collaborator: every schedule primitive is paired with the
/// cancel primitive that reverses it.
///
/// Cancellation must be idempotent and safe after the timer fired — the
/// runtime replays recorded cancels unconditionally at disposal.
/// Whether work already in flight observes the cancellation is the
/// implementation's contract, not the runtime's.
pub trait TimerService: Send + Sync {
    /// Run `f` every `period` until cancelled.
    fn set_interval(&self, period: Duration, f: IntervalFn) -> TimerId;

    /// Cancel a repeating timer.
    fn clear_interval(&self, id: TimerId);

    /// Run `f` once after `delay`.
    fn set_timeout(&self, delay: Duration, f: OneShotFn) -> TimerId;

    /// Cancel a pending one-shot timer.
    fn clear_timeout(&self, id: TimerId);

    /// Run `f` as soon as the scheduler gets to it.
    fn set_immediate(&self, f: OneShotFn) -> TimerId;

    /// Cancel a pending immediate.
    fn clear_immediate(&self, id: TimerId);
}

/// [`TimerService`] backed by spawned Tokio tasks.
///
/// Each schedule spawns a task tracked in a concurrent map; cancel
/// aborts the task. A one-shot that already fired has removed its own
/// entry, so a late cancel degrades to a no-op.
pub struct TokioTimers {
    handle: Handle,
    tasks: Arc<DashMap<TimerId, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl TokioTimers {
    /// Bind to the ambient Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Bind to an explicit runtime handle.
    #[must_use]
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Number of timers currently tracked.
    ///
    /// A one-shot that fired a moment ago may still be counted until
    /// its self-removal lands.
    #[must_use]
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    fn next(&self) -> TimerId {
        TimerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn cancel(&self, id: TimerId) {
        if let Some((_, task)) = self.tasks.remove(&id) {
            task.abort();
            trace!(timer_id = %id, "Timer cancelled");
        }
    }
}

impl TimerService for TokioTimers {
    fn set_interval(&self, period: Duration, mut f: IntervalFn) -> TimerId {
        let id = self.next();
        let task = self.handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a Tokio interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                f();
            }
        });
        self.tasks.insert(id, task);
        trace!(timer_id = %id, ?period, "Interval scheduled");
        id
    }

    fn clear_interval(&self, id: TimerId) {
        self.cancel(id);
    }

    fn set_timeout(&self, delay: Duration, f: OneShotFn) -> TimerId {
        let id = self.next();
        let tasks = Arc::clone(&self.tasks);
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            f();
            // A zero-delay task can get here before the insert below;
            // the stale handle that leaves behind is inert and reaped
            // by the next cancel.
            tasks.remove(&id);
        });
        self.tasks.insert(id, task);
        trace!(timer_id = %id, ?delay, "Timeout scheduled");
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.cancel(id);
    }

    fn set_immediate(&self, f: OneShotFn) -> TimerId {
        let id = self.next();
        let tasks = Arc::clone(&self.tasks);
        let task = self.handle.spawn(async move {
            f();
            tasks.remove(&id);
        });
        self.tasks.insert(id, task);
        trace!(timer_id = %id, "Immediate scheduled");
        id
    }

    fn clear_immediate(&self, id: TimerId) {
        self.cancel(id);
    }
}

impl fmt::Debug for TokioTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioTimers")
            .field("active", &self.tasks.len())
            .finish()
    }
}
