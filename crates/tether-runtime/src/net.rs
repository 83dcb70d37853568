//! Network collaborator port: route and live-connection registration.
//!
//! The runtime does not implement a network stack. It consumes this
//! port when the host wires one in, and degrades the route/connection
//! capabilities to unavailable when it does not.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::capability::Disposable;

/// Handles requests arriving on one mounted route.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// Serve one request payload.
    ///
    /// # Errors
    ///
    /// Handler-defined; the collaborator maps errors onto its wire
    /// format.
    async fn handle(&self, request: Value) -> anyhow::Result<Value>;
}

/// A route to mount: name, path pattern, handler.
#[derive(Clone)]
pub struct RouteSpec {
    /// Route name, unique within the network collaborator.
    pub name: String,
    /// Path pattern the collaborator matches on.
    pub path: String,
    /// Request handler.
    pub handler: Arc<dyn RouteHandler>,
}

impl RouteSpec {
    /// Bundle a route spec.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            handler,
        }
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Handles messages on one live-connection endpoint.
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    /// React to one inbound message; `Some` replies, `None` stays quiet.
    ///
    /// # Errors
    ///
    /// Handler-defined; the collaborator decides whether an error
    /// closes the connection.
    async fn on_message(&self, message: Value) -> anyhow::Result<Option<Value>>;
}

/// A live-connection endpoint to mount.
#[derive(Clone)]
pub struct ConnectionSpec {
    /// Endpoint name, unique within the network collaborator.
    pub name: String,
    /// Path the collaborator accepts connections on.
    pub path: String,
    /// Message handler shared by all connections on this endpoint.
    pub handler: Arc<dyn ConnectionHandler>,
}

impl ConnectionSpec {
    /// Bundle a connection spec.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            handler,
        }
    }
}

impl fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The network collaborator.
///
/// Both factories hand back the action that unmounts what they mounted;
/// the runtime records it so disposal reverses the registration.
pub trait NetworkService: Send + Sync {
    /// Mount a route.
    fn register_route(&self, route: RouteSpec) -> Disposable;

    /// Mount a live-connection endpoint.
    fn register_connection(&self, connection: ConnectionSpec) -> Disposable;
}
