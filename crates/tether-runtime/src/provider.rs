//! Typed module provider registry.
//!
//! Modules publish provider objects under a `(kind, id)` key — one
//! pluggable interface per kind, one instance per id. The registry does
//! not interpret the values; consumers downcast according to the kind
//! they asked for.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{RuntimeError, RuntimeResult};

/// A provider object; its concrete shape is fixed by the `kind` it is
/// registered under.
pub type Provider = Arc<dyn Any + Send + Sync>;

/// Process-wide two-level mapping: kind → instance id → provider.
///
/// `(kind, id)` pairs are unique; a second registration under a live
/// pair is rejected without touching the existing entry.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, HashMap<String, Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `(kind, id)`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateProvider`] if the pair is taken.
    pub fn add(
        &mut self,
        kind: impl Into<String>,
        id: impl Into<String>,
        provider: Provider,
    ) -> RuntimeResult<()> {
        let kind = kind.into();
        let id = id.into();
        if self
            .providers
            .get(&kind)
            .is_some_and(|bucket| bucket.contains_key(&id))
        {
            return Err(RuntimeError::DuplicateProvider { kind, id });
        }
        debug!(%kind, %id, "Registered provider");
        self.providers.entry(kind).or_default().insert(id, provider);
        Ok(())
    }

    /// Remove the provider under `(kind, id)`, returning it if present.
    ///
    /// Absent keys are a no-op; an emptied kind bucket is dropped.
    pub fn remove(&mut self, kind: &str, id: &str) -> Option<Provider> {
        let bucket = self.providers.get_mut(kind)?;
        let removed = bucket.remove(id);
        if bucket.is_empty() {
            self.providers.remove(kind);
        }
        if removed.is_some() {
            trace!(%kind, %id, "Removed provider");
        }
        removed
    }

    /// Look up the provider under `(kind, id)`.
    #[must_use]
    pub fn get(&self, kind: &str, id: &str) -> Option<Provider> {
        self.providers
            .get(kind)
            .and_then(|bucket| bucket.get(id))
            .cloned()
    }

    /// Whether `(kind, id)` is registered.
    #[must_use]
    pub fn contains(&self, kind: &str, id: &str) -> bool {
        self.providers
            .get(kind)
            .is_some_and(|bucket| bucket.contains_key(id))
    }

    /// All kinds with at least one provider.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Instance ids registered under `kind`.
    #[must_use]
    pub fn ids(&self, kind: &str) -> Vec<&str> {
        self.providers
            .get(kind)
            .map(|bucket| bucket.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of registered providers across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.values().map(HashMap::len).sum()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kind_count", &self.providers.len())
            .field("provider_count", &self.len())
            .finish()
    }
}
