//! Host composition root: registries and collaborator wiring.

use std::fmt;
use std::sync::{Arc, RwLock};

use tether_events::EventBus;

use crate::inject::InjectService;
use crate::net::NetworkService;
use crate::provider::ProviderRegistry;
use crate::script::ScriptRegistry;
use crate::timer::{TimerService, TokioTimers};

/// Everything a runtime reaches for on behalf of its modules: the event
/// bus, the process-wide registries, and the collaborator ports.
///
/// Built once by the embedding process and shared (`Arc`) with every
/// [`Runtime`](crate::Runtime). The registries are explicit state here
/// rather than process globals, so two hosts in one process stay fully
/// independent.
pub struct Host {
    bus: EventBus,
    scripts: Arc<RwLock<ScriptRegistry>>,
    providers: Arc<RwLock<ProviderRegistry>>,
    timers: Arc<dyn TimerService>,
    network: Option<Arc<dyn NetworkService>>,
    injector: Option<Arc<dyn InjectService>>,
}

impl Host {
    /// Start assembling a host.
    #[must_use]
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    /// The event bus modules subscribe through.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The named-script registry.
    #[must_use]
    pub fn scripts(&self) -> &Arc<RwLock<ScriptRegistry>> {
        &self.scripts
    }

    /// The typed provider registry.
    #[must_use]
    pub fn providers(&self) -> &Arc<RwLock<ProviderRegistry>> {
        &self.providers
    }

    /// The timer collaborator.
    #[must_use]
    pub fn timers(&self) -> &Arc<dyn TimerService> {
        &self.timers
    }

    pub(crate) fn network(&self) -> Option<&Arc<dyn NetworkService>> {
        self.network.as_ref()
    }

    pub(crate) fn injector(&self) -> Option<&Arc<dyn InjectService>> {
        self.injector.as_ref()
    }

    /// Whether a network collaborator is wired in.
    #[must_use]
    pub fn has_network(&self) -> bool {
        self.network.is_some()
    }

    /// Whether an injection collaborator is wired in.
    #[must_use]
    pub fn has_injector(&self) -> bool {
        self.injector.is_some()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("has_network", &self.has_network())
            .field("has_injector", &self.has_injector())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Host`].
///
/// Defaults: fresh event bus, Tokio timer service, no network
/// collaborator, no injection collaborator.
#[derive(Default)]
pub struct HostBuilder {
    bus: Option<EventBus>,
    timers: Option<Arc<dyn TimerService>>,
    network: Option<Arc<dyn NetworkService>>,
    injector: Option<Arc<dyn InjectService>>,
}

impl HostBuilder {
    /// Use an existing bus (e.g. one shared with the embedding process).
    #[must_use]
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Replace the timer collaborator.
    #[must_use]
    pub fn timers(mut self, timers: Arc<dyn TimerService>) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Wire in a network collaborator.
    #[must_use]
    pub fn network(mut self, network: Arc<dyn NetworkService>) -> Self {
        self.network = Some(network);
        self
    }

    /// Wire in an injection collaborator.
    #[must_use]
    pub fn injector(mut self, injector: Arc<dyn InjectService>) -> Self {
        self.injector = Some(injector);
        self
    }

    /// Assemble the host.
    ///
    /// # Panics
    ///
    /// The default timer service binds to the ambient Tokio runtime and
    /// panics outside one; supply [`HostBuilder::timers`] to drop that
    /// dependency.
    #[must_use]
    pub fn build(self) -> Arc<Host> {
        Arc::new(Host {
            bus: self.bus.unwrap_or_default(),
            scripts: Arc::new(RwLock::new(ScriptRegistry::new())),
            providers: Arc::new(RwLock::new(ProviderRegistry::new())),
            timers: self
                .timers
                .unwrap_or_else(|| Arc::new(TokioTimers::current())),
            network: self.network,
            injector: self.injector,
        })
    }
}

impl fmt::Debug for HostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBuilder")
            .field("has_bus", &self.bus.is_some())
            .field("has_timers", &self.timers.is_some())
            .field("has_network", &self.network.is_some())
            .field("has_injector", &self.injector.is_some())
            .finish()
    }
}
