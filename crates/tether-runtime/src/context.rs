//! The capability context handed to a module at load time.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use tether_events::{Handler, SubscriptionId};

use crate::capability::Ledger;
use crate::error::{RuntimeError, RuntimeResult};
use crate::host::Host;
use crate::net::{ConnectionSpec, RouteSpec};
use crate::provider::Provider;
use crate::script::ScriptDescriptor;
use crate::timer::{IntervalFn, OneShotFn, TimerId};

/// Capability surface for one `load()` call.
///
/// Every granting method records the matching teardown in the owning
/// runtime's ledger before returning, so a module's registrations are
/// undone automatically — in registration order — when the runtime is
/// disposed. The context exists only for the duration of
/// [`Module::apply`](crate::Module::apply); capture what you need from
/// the grants, not the context itself.
pub struct Context<'rt> {
    host: Arc<Host>,
    ledger: &'rt mut Ledger,
}

impl<'rt> Context<'rt> {
    pub(crate) fn new(host: Arc<Host>, ledger: &'rt mut Ledger) -> Self {
        Self { host, ledger }
    }

    // -- event bus -----------------------------------------------------

    /// Subscribe to a bus topic; unsubscribed at disposal.
    pub fn on(&mut self, topic: impl Into<String>, handler: Handler) -> SubscriptionId {
        let id = self.host.bus().on(topic, handler);
        self.track_off(id);
        id
    }

    /// Subscribe for a single delivery.
    ///
    /// Still tracked: if the event never fires, disposal removes the
    /// pending subscription; if it did fire, the recorded `off` is a
    /// no-op.
    pub fn once(&mut self, topic: impl Into<String>, handler: Handler) -> SubscriptionId {
        let id = self.host.bus().once(topic, handler);
        self.track_off(id);
        id
    }

    /// Unsubscribe explicitly.
    ///
    /// Passthrough — unsubscribing needs no teardown of its own, so
    /// nothing is recorded.
    pub fn off(&self, id: SubscriptionId) {
        self.host.bus().off(id);
    }

    fn track_off(&mut self, id: SubscriptionId) {
        let bus = self.host.bus().clone();
        self.ledger.push(Box::new(move || bus.off(id)));
    }

    // -- registries ----------------------------------------------------

    /// Register a named script; removed from the registry at disposal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::DuplicateScript`] when the name is taken; the
    /// ledger is not touched.
    pub fn add_script(
        &mut self,
        name: impl Into<String>,
        descriptor: ScriptDescriptor,
    ) -> RuntimeResult<()> {
        let name = name.into();
        self.host
            .scripts()
            .write()
            .expect("script registry poisoned")
            .add(name.clone(), descriptor)?;
        let host = Arc::clone(&self.host);
        self.ledger.push(Box::new(move || {
            host.scripts()
                .write()
                .expect("script registry poisoned")
                .remove(&name);
        }));
        Ok(())
    }

    /// Register a provider under `(kind, id)`; removed at disposal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::DuplicateProvider`] when the pair is taken; the
    /// ledger is not touched.
    pub fn provide(
        &mut self,
        kind: impl Into<String>,
        id: impl Into<String>,
        provider: Provider,
    ) -> RuntimeResult<()> {
        let kind = kind.into();
        let id = id.into();
        self.host
            .providers()
            .write()
            .expect("provider registry poisoned")
            .add(kind.clone(), id.clone(), provider)?;
        let host = Arc::clone(&self.host);
        self.ledger.push(Box::new(move || {
            host.providers()
                .write()
                .expect("provider registry poisoned")
                .remove(&kind, &id);
        }));
        Ok(())
    }

    // -- timers --------------------------------------------------------

    /// Schedule a repeating callback; cancelled at disposal.
    pub fn set_interval(&mut self, period: Duration, f: IntervalFn) -> TimerId {
        let id = self.host.timers().set_interval(period, f);
        let timers = Arc::clone(self.host.timers());
        self.ledger.push(Box::new(move || timers.clear_interval(id)));
        id
    }

    /// Schedule a one-shot callback; cancelled at disposal if pending.
    pub fn set_timeout(&mut self, delay: Duration, f: OneShotFn) -> TimerId {
        let id = self.host.timers().set_timeout(delay, f);
        let timers = Arc::clone(self.host.timers());
        self.ledger.push(Box::new(move || timers.clear_timeout(id)));
        id
    }

    /// Schedule a callback for the next scheduler pass; cancelled at
    /// disposal if still pending.
    pub fn set_immediate(&mut self, f: OneShotFn) -> TimerId {
        let id = self.host.timers().set_immediate(f);
        let timers = Arc::clone(self.host.timers());
        self.ledger.push(Box::new(move || timers.clear_immediate(id)));
        id
    }

    // -- network -------------------------------------------------------

    /// Whether route/connection registration is available.
    #[must_use]
    pub fn has_network(&self) -> bool {
        self.host.has_network()
    }

    /// Mount a route; unmounted at disposal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::CapabilityUnavailable`] when the host has no
    /// network collaborator. Probe [`Context::has_network`] first to
    /// keep a load from failing on a host without one.
    pub fn route(&mut self, route: RouteSpec) -> RuntimeResult<()> {
        let network = self
            .host
            .network()
            .ok_or(RuntimeError::CapabilityUnavailable { capability: "route" })?;
        let unmount = network.register_route(route);
        self.ledger.push(unmount);
        Ok(())
    }

    /// Mount a live-connection endpoint; unmounted at disposal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::CapabilityUnavailable`] when the host has no
    /// network collaborator.
    pub fn connection(&mut self, connection: ConnectionSpec) -> RuntimeResult<()> {
        let network = self
            .host
            .network()
            .ok_or(RuntimeError::CapabilityUnavailable {
                capability: "connection",
            })?;
        let unmount = network.register_connection(connection);
        self.ledger.push(unmount);
        Ok(())
    }

    // -- injection -----------------------------------------------------

    /// Whether the injection collaborator is available.
    #[must_use]
    pub fn has_injector(&self) -> bool {
        self.host.has_injector()
    }

    /// Inject a payload at a host extension point; removed at disposal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::CapabilityUnavailable`] when the host has no
    /// injection collaborator.
    pub fn inject(&mut self, target: &str, payload: Value) -> RuntimeResult<()> {
        let injector = self
            .host
            .injector()
            .ok_or(RuntimeError::CapabilityUnavailable {
                capability: "inject",
            })?;
        let remove = injector.inject(target, payload);
        self.ledger.push(remove);
        Ok(())
    }
}
