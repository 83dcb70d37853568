//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tether_events::prelude::*;` to import all essential types.

pub use crate::{EventBus, Handler, SubscriptionId};
