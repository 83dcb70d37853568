//! Dependency-injection collaborator port.

use serde_json::Value;

use crate::capability::Disposable;

/// Host extension-point injection.
///
/// Registers `payload` under the `target` extension point — a UI slot,
/// a template hook, whatever the host exposes — and hands back the
/// action that removes it again. The runtime records that action so the
/// injection disappears with the module.
pub trait InjectService: Send + Sync {
    /// Inject `payload` at the `target` extension point.
    fn inject(&self, target: &str, payload: Value) -> Disposable;
}
