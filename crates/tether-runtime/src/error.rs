//! Runtime error types.

use crate::module::ModuleId;

/// Errors from module lifecycle and registry operations.
///
/// Nothing here is retryable: every variant signals a programming or
/// configuration error at the call site, not a transient condition.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// `load()` was called on a runtime that is already loaded.
    #[error("module already loaded: {module}")]
    AlreadyLoaded {
        /// The module that was loaded twice.
        module: ModuleId,
    },

    /// A script with this name is already registered.
    #[error("duplicate script registered: {name}")]
    DuplicateScript {
        /// The conflicting script name.
        name: String,
    },

    /// A provider is already registered under this kind and id.
    #[error("duplicate provider registered: {kind}/{id}")]
    DuplicateProvider {
        /// The provider kind.
        kind: String,
        /// The instance id within the kind.
        id: String,
    },

    /// The capability's collaborator is not wired into the host.
    #[error("capability not available: {capability}")]
    CapabilityUnavailable {
        /// Name of the missing capability.
        capability: &'static str,
    },

    /// The module's entry point returned an error.
    ///
    /// Disposables recorded before the failure stay in the ledger; the
    /// host must still dispose the runtime to release them.
    #[error("module entry point failed: {module}")]
    EntryPoint {
        /// The module whose `apply` failed.
        module: ModuleId,
        /// The module's own error chain.
        #[source]
        source: anyhow::Error,
    },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
