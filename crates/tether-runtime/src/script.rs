//! Named script registry and the script contract.
//!
//! Scripts are runnable maintenance units a module registers under a
//! process-unique name. The runtime only stores them and removes them at
//! disposal; whatever execution engine later invokes them looks them up
//! here.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{RuntimeError, RuntimeResult};

/// Sink for progress output while a script runs.
pub type Report = Arc<dyn Fn(&str) + Send + Sync>;

/// Argument validator applied before a script runs.
///
/// Returns a description of the mismatch when the value is rejected.
pub type Validate = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// A runnable unit registered under a unique name.
#[async_trait]
pub trait Script: Send + Sync {
    /// Run with validated arguments, reporting progress through `report`.
    ///
    /// Resolves to `true` on success and `false` on a clean refusal.
    ///
    /// # Errors
    ///
    /// Script-defined; the registry never invokes `run` itself.
    async fn run(&self, args: Value, report: Report) -> anyhow::Result<bool>;
}

/// Everything the registry holds about one named script.
#[derive(Clone)]
pub struct ScriptDescriptor {
    /// Human-readable description.
    pub description: String,
    /// Input validator applied before `run`.
    pub validate: Validate,
    /// The runnable itself.
    pub run: Arc<dyn Script>,
}

impl ScriptDescriptor {
    /// Bundle a descriptor.
    pub fn new(description: impl Into<String>, validate: Validate, run: Arc<dyn Script>) -> Self {
        Self {
            description: description.into(),
            validate,
            run,
        }
    }
}

impl fmt::Debug for ScriptDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptDescriptor")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Process-wide mapping from script name to descriptor.
///
/// Names are unique: a second registration under a live name is
/// rejected without touching the existing entry.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, ScriptDescriptor>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateScript`] if `name` is taken.
    pub fn add(&mut self, name: impl Into<String>, descriptor: ScriptDescriptor) -> RuntimeResult<()> {
        let name = name.into();
        if self.scripts.contains_key(&name) {
            return Err(RuntimeError::DuplicateScript { name });
        }
        debug!(script = %name, "Registered script");
        self.scripts.insert(name, descriptor);
        Ok(())
    }

    /// Remove the entry under `name`, returning it if present.
    ///
    /// Removing an absent name is a no-op, so a disposer may replay
    /// after its entry was already cleared.
    pub fn remove(&mut self, name: &str) -> Option<ScriptDescriptor> {
        let removed = self.scripts.remove(name);
        if removed.is_some() {
            trace!(script = %name, "Removed script");
        }
        removed
    }

    /// Look up a script by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScriptDescriptor> {
        self.scripts.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// All registered names, in no particular order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    /// Number of registered scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
