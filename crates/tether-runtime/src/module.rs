//! Module contract and identifiers.

use std::fmt;
use std::path::Path;

use crate::capability::Disposable;
use crate::context::Context;

/// Identifier of a module: the source path or filename the host loaded
/// it from.
///
/// Stable for as long as the module stays in the
/// [`RuntimeDirectory`](crate::RuntimeDirectory). Unlike user-facing
/// ids there is no charset restriction — the value is host-controlled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&Path> for ModuleId {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unit of extension code the host can load and unload.
///
/// The entry point runs synchronously at load time and registers
/// behavior through the [`Context`]; teardown of everything registered
/// that way is automatic. Only cleanup the runtime cannot see —
/// resources acquired outside the context — needs [`Module::teardown`].
pub trait Module: Send + Sync {
    /// Entry point, called once per load with the capability context.
    ///
    /// The context is not retained after this call returns; capture
    /// whatever handles you need while it is in scope.
    ///
    /// # Errors
    ///
    /// Errors propagate to the `load()` caller with the module id
    /// attached. Registrations made before the failure stay pending in
    /// the runtime's ledger — the host disposes the runtime to release
    /// them.
    fn apply(&self, ctx: &mut Context<'_>) -> anyhow::Result<()>;

    /// Module-declared cleanup, recorded before any tracked teardown.
    ///
    /// Runs first at disposal, and runs even when the module never
    /// invoked a capability. The default `None` means the context
    /// tracked everything there is to undo.
    fn teardown(&self) -> Option<Disposable> {
        None
    }

    /// Whether this load performed side effects the runtime cannot
    /// undo. Read once, after [`Module::apply`] returns successfully.
    fn side_effect(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_module_id_display_round_trip() {
        let id = ModuleId::new("plugins/report.rs");
        assert_eq!(id.to_string(), "plugins/report.rs");
        assert_eq!(id.as_str(), "plugins/report.rs");
    }

    #[test]
    fn test_module_id_from_path() {
        let path = PathBuf::from("/srv/modules/pastebin.so");
        let id = ModuleId::from(path.as_path());
        assert_eq!(id.as_str(), "/srv/modules/pastebin.so");
    }

    #[test]
    fn test_default_teardown_and_side_effect() {
        struct Inert;
        impl Module for Inert {
            fn apply(&self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let module = Inert;
        assert!(module.teardown().is_none());
        assert!(!module.side_effect());
    }
}
