//! Tether Runtime - module lifecycle management with tracked teardown.
//!
//! A host process loads extension modules through a [`Runtime`]. At
//! load time each module receives a capability [`Context`] and
//! registers behavior through it — event subscriptions, timers, named
//! scripts, typed providers, routes. Every grant records its matching
//! teardown in the runtime's [`Ledger`], and disposal replays that
//! record oldest-first, so the module's side effects disappear without
//! the module author writing teardown logic.
//!
//! This crate provides:
//! - [`Runtime`]: per-module state machine (unloaded → loaded → disposed)
//! - [`RuntimeDirectory`]: module id → runtime map with get-or-create
//! - [`Context`]: the capability surface handed to [`Module::apply`]
//! - [`ScriptRegistry`] / [`ProviderRegistry`]: process-wide registries
//! - [`Host`]: the composition root owning registries and collaborators
//! - [`TimerService`] / [`NetworkService`] / [`InjectService`]:
//!   collaborator ports, with the Tokio-backed [`TokioTimers`]
//!   implementation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tether_runtime::{Context, Host, Module, ModuleId, RuntimeDirectory};
//!
//! struct Announcer;
//!
//! impl Module for Announcer {
//!     fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
//!         ctx.on("user/login", Arc::new(|payload| {
//!             println!("login: {payload}");
//!         }));
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
//! # let _guard = rt.enter();
//! let host = Host::builder().build();
//! let mut directory = RuntimeDirectory::new(Arc::clone(&host));
//!
//! let id = ModuleId::new("plugins/announcer");
//! let runtime = directory.get(&id);
//! runtime.load(&Announcer)?;
//! assert!(runtime.is_loaded());
//!
//! runtime.dispose();
//! assert!(!runtime.is_loaded());
//! assert!(host.bus().is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod capability;
mod context;
mod error;
mod host;
mod inject;
mod module;
mod net;
mod provider;
mod runtime;
mod script;
mod timer;

pub use capability::{Disposable, Ledger};
pub use context::Context;
pub use error::{RuntimeError, RuntimeResult};
pub use host::{Host, HostBuilder};
pub use inject::InjectService;
pub use module::{Module, ModuleId};
pub use net::{ConnectionHandler, ConnectionSpec, NetworkService, RouteHandler, RouteSpec};
pub use provider::{Provider, ProviderRegistry};
pub use runtime::{Runtime, RuntimeDirectory};
pub use script::{Report, Script, ScriptDescriptor, ScriptRegistry, Validate};
pub use timer::{IntervalFn, OneShotFn, TimerId, TimerService, TokioTimers};

// Bus types appear in the `Context` surface; re-exported so module
// authors depend on one crate.
pub use tether_events::{EventBus, Handler, SubscriptionId};
