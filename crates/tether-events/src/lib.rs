//! Tether Events - synchronous topic bus for the tether module runtime.
//!
//! This crate provides:
//! - [`EventBus`]: topic-keyed handler dispatch with tracked subscriptions
//! - [`SubscriptionId`]: unsubscribe tokens returned by `on`/`once`
//!
//! Handlers run on the emitting thread, in registration order. Every
//! subscription hands back a [`SubscriptionId`] so the caller — or the
//! module runtime on the caller's behalf — can undo it later with
//! [`EventBus::off`], which is idempotent.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tether_events::EventBus;
//!
//! let bus = EventBus::new();
//! let id = bus.on("record/change", Arc::new(|payload| {
//!     assert_eq!(payload["rid"], 42);
//! }));
//!
//! let delivered = bus.emit("record/change", &serde_json::json!({ "rid": 42 }));
//! assert_eq!(delivered, 1);
//!
//! bus.off(id);
//! assert_eq!(bus.handler_count("record/change"), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod subscriber;

pub use bus::EventBus;
pub use subscriber::{Handler, SubscriptionId};
