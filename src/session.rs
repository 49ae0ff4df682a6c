//! Session lifecycle controller
//!
//! The single entry point into the relay core. Every external event goes
//! through one of the `on_*` methods, which mutate the registry and return
//! the deliveries the transport should carry out. Taking `&mut self`
//! serializes mutation, roster snapshot and emission for each event.

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::message::{Delivery, ServerMessage};
use crate::presence;
use crate::registry::ConnectionRegistry;
use crate::router;
use crate::types::ConnectionId;

/// Owns the registry and dispatches connect/join/disconnect/message events
#[derive(Debug)]
pub struct SessionController<C: Clock = SystemClock> {
    registry: ConnectionRegistry,
    clock: C,
}

impl SessionController<SystemClock> {
    /// Create a controller stamping messages with the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SessionController<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionController<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            clock,
        }
    }

    /// Read access to the registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// A connection was accepted. It stays anonymous until it joins.
    pub fn on_connect(&mut self, connection_id: ConnectionId) -> Vec<Delivery> {
        info!("Client connected: {}", connection_id);
        Vec::new()
    }

    /// Bind a display name, announce it, and acknowledge the joiner
    ///
    /// A second join from the same connection replaces the earlier name
    /// without a `userLeft` for it.
    pub fn on_join(&mut self, connection_id: ConnectionId, display_name: String) -> Vec<Delivery> {
        self.registry.bind(connection_id, display_name.as_str());
        info!("Client {} joined as '{}'", connection_id, display_name);
        debug!("Online users: {}", self.registry.len());

        let mut out = presence::notify_joined(&self.registry, &display_name);
        out.push(Delivery::Unicast(
            connection_id,
            ServerMessage::Join(format!("{} joined the chat", display_name)),
        ));
        out
    }

    /// Drop the connection's session and announce the departure, if any
    pub fn on_disconnect(&mut self, connection_id: ConnectionId) -> Vec<Delivery> {
        let Some(display_name) = self.registry.unbind(connection_id) else {
            debug!("Client disconnected: {} (never joined)", connection_id);
            return Vec::new();
        };

        info!("Client disconnected: {} ({})", connection_id, display_name);
        debug!("Online users: {}", self.registry.len());
        presence::notify_left(&self.registry, &display_name)
    }

    /// Route a chat message
    pub fn on_message(&mut self, connection_id: ConnectionId, raw: &str) -> Vec<Delivery> {
        router::route(&self.registry, &self.clock, connection_id, raw)
    }
}
