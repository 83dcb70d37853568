//! Disposable tracking: the ledger every capability grant feeds.
//!
//! A capability grant resolves to one of three teardown shapes, fixed
//! per capability when the context is built rather than probed at call
//! time:
//!
//! - **direct** — the grant's result is itself the teardown action
//!   (route and connection registration, injection);
//! - **paired cancel** — the grant returns an opaque handle and the
//!   matching cancel primitive is recorded with it (timers with their
//!   `clear_*` counterparts, bus subscriptions with `off`);
//! - **unavailable** — the collaborator is absent from the host, and
//!   the capability reports
//!   [`CapabilityUnavailable`](crate::RuntimeError::CapabilityUnavailable)
//!   instead of granting anything.
//!
//! Whatever the shape, the outcome is one entry in the owning runtime's
//! [`Ledger`]. Tracking is strictly additive: a grant that fails
//! appends nothing, and nothing already recorded is removed or
//! reordered.

use std::fmt;

/// A zero-argument teardown action reversing one registration.
pub type Disposable = Box<dyn FnOnce() + Send>;

/// Ordered record of pending teardown actions for one runtime.
///
/// Drained oldest-first at disposal: a later registration may depend on
/// an earlier one still being live during its own teardown, so nothing
/// is torn down before something that was set up after it.
#[derive(Default)]
pub struct Ledger {
    entries: Vec<Disposable>,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a teardown action.
    pub(crate) fn push(&mut self, disposable: Disposable) {
        self.entries.push(disposable);
    }

    /// Number of pending teardown actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every pending action, oldest first, leaving the ledger empty.
    pub(crate) fn drain(&mut self) {
        for dispose in self.entries.drain(..) {
            dispose();
        }
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("pending", &self.entries.len())
            .finish()
    }
}
