//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tether_runtime::prelude::*;` to import all essential types.

// Lifecycle
pub use crate::{Context, Module, ModuleId, Runtime, RuntimeDirectory};

// Teardown tracking
pub use crate::{Disposable, Ledger};

// Host assembly
pub use crate::{Host, HostBuilder};

// Registries
pub use crate::{Provider, ProviderRegistry, Report, Script, ScriptDescriptor, ScriptRegistry, Validate};

// Collaborator ports
pub use crate::{
    ConnectionHandler, ConnectionSpec, InjectService, IntervalFn, NetworkService, OneShotFn,
    RouteHandler, RouteSpec, TimerId, TimerService, TokioTimers,
};

// Errors
pub use crate::{RuntimeError, RuntimeResult};

// Bus types surfaced by the context
pub use crate::{EventBus, Handler, SubscriptionId};
