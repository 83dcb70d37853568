//! The per-module runtime state machine and the directory that owns one
//! runtime per module id.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::capability::Ledger;
use crate::context::Context;
use crate::error::{RuntimeError, RuntimeResult};
use crate::host::Host;
use crate::module::{Module, ModuleId};

/// Lifecycle manager for one module.
///
/// `unloaded → loaded` via [`Runtime::load`], back via
/// [`Runtime::dispose`]. A disposed runtime is observably identical to
/// a never-loaded one and may be loaded again; the object itself
/// survives unload/reload cycles, with only the loaded flag, the
/// side-effect flag and the ledger resetting.
///
/// `&mut self` on both transitions is the serialization contract: the
/// host hands one caller at a time to a given runtime.
pub struct Runtime {
    id: ModuleId,
    host: Arc<Host>,
    loaded: bool,
    side_effect: bool,
    ledger: Ledger,
}

impl Runtime {
    /// Create an unloaded runtime for `id`.
    #[must_use]
    pub fn new(id: ModuleId, host: Arc<Host>) -> Self {
        Self {
            id,
            host,
            loaded: false,
            side_effect: false,
            ledger: Ledger::new(),
        }
    }

    /// The module id this runtime manages.
    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Whether a module is currently loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the loaded module declared side effects the runtime
    /// cannot undo. Hosts restart the process instead of hot-reloading
    /// such modules.
    #[must_use]
    pub fn has_side_effect(&self) -> bool {
        self.side_effect
    }

    /// The pending teardown record.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Load a module: run its entry point with a fresh capability
    /// context and start tracking its registrations.
    ///
    /// The entry point runs synchronously to completion. A
    /// module-declared [`teardown`](Module::teardown) is recorded
    /// before anything else, so it both precedes every tracked
    /// capability disposal and is honored even when the module never
    /// touches a capability. The module's
    /// [`side_effect`](Module::side_effect) flag is read once, after
    /// the entry point succeeds.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::AlreadyLoaded`] when called in the loaded state;
    /// existing registrations are untouched.
    ///
    /// [`RuntimeError::EntryPoint`] when `apply` fails. The runtime
    /// stays unloaded, but disposables recorded before the failure
    /// remain in the ledger — call [`Runtime::dispose`] to release
    /// them.
    pub fn load(&mut self, module: &dyn Module) -> RuntimeResult<()> {
        if self.loaded {
            return Err(RuntimeError::AlreadyLoaded {
                module: self.id.clone(),
            });
        }
        self.side_effect = false;
        if let Some(cleanup) = module.teardown() {
            self.ledger.push(cleanup);
        }
        let mut ctx = Context::new(Arc::clone(&self.host), &mut self.ledger);
        module.apply(&mut ctx).map_err(|source| RuntimeError::EntryPoint {
            module: self.id.clone(),
            source,
        })?;
        self.side_effect = module.side_effect();
        self.loaded = true;
        info!(
            module = %self.id,
            pending_teardown = self.ledger.len(),
            side_effect = self.side_effect,
            "Module loaded"
        );
        Ok(())
    }

    /// Undo everything the current load registered, oldest first, and
    /// return to the unloaded state.
    ///
    /// Safe in any state: over an empty ledger (never loaded, or
    /// already disposed) this is a no-op. It is also the release path
    /// after a failed [`Runtime::load`].
    pub fn dispose(&mut self) {
        let pending = self.ledger.len();
        self.ledger.drain();
        self.loaded = false;
        self.side_effect = false;
        if pending > 0 {
            info!(module = %self.id, released = pending, "Module disposed");
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("id", &self.id)
            .field("loaded", &self.loaded)
            .field("side_effect", &self.side_effect)
            .field("pending_teardown", &self.ledger.len())
            .finish()
    }
}

/// Process-wide map from module id to its runtime.
///
/// One runtime is created per id on first access and reused for every
/// reload cycle after — reload is `dispose()` then `load()` on the same
/// object, never recreation. Entry eviction is the host's call and not
/// provided here.
pub struct RuntimeDirectory {
    host: Arc<Host>,
    runtimes: HashMap<ModuleId, Runtime>,
}

impl RuntimeDirectory {
    /// Create an empty directory whose runtimes share `host`.
    #[must_use]
    pub fn new(host: Arc<Host>) -> Self {
        Self {
            host,
            runtimes: HashMap::new(),
        }
    }

    /// The runtime for `id`, created on first access.
    pub fn get(&mut self, id: &ModuleId) -> &mut Runtime {
        self.runtimes.entry(id.clone()).or_insert_with(|| {
            debug!(module = %id, "Runtime created");
            Runtime::new(id.clone(), Arc::clone(&self.host))
        })
    }

    /// The runtime for `id`, if one was ever created.
    #[must_use]
    pub fn lookup(&self, id: &ModuleId) -> Option<&Runtime> {
        self.runtimes.get(id)
    }

    /// Ids with a runtime in the directory.
    #[must_use]
    pub fn ids(&self) -> Vec<&ModuleId> {
        self.runtimes.keys().collect()
    }

    /// Number of runtimes in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }
}

impl fmt::Debug for RuntimeDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeDirectory")
            .field("runtime_count", &self.runtimes.len())
            .finish()
    }
}
