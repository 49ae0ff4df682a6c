//! Connection registry
//!
//! Source of truth for who is online: maps each joined connection to its
//! display name.

use tracing::debug;

use crate::types::ConnectionId;

/// A joined connection and the display name bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub display_name: String,
}

/// Bidirectional connection ↔ display name mapping
///
/// Entries are kept in insertion order; rebinding a connection keeps its
/// position. Display names are not unique, so reverse lookup returns the
/// first match in that order.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: Vec<Session>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a display name to a connection, replacing any earlier binding
    pub fn bind(&mut self, connection_id: ConnectionId, display_name: impl Into<String>) {
        let display_name = display_name.into();
        match self.position(connection_id) {
            Some(index) => {
                debug!(
                    "Connection {} rebound from '{}' to '{}'",
                    connection_id, self.sessions[index].display_name, display_name
                );
                self.sessions[index].display_name = display_name;
            }
            None => self.sessions.push(Session {
                connection_id,
                display_name,
            }),
        }
    }

    /// Remove a connection's session
    ///
    /// Returns the name that was bound, or None if the connection never
    /// joined (or was already removed).
    pub fn unbind(&mut self, connection_id: ConnectionId) -> Option<String> {
        let index = self.position(connection_id)?;
        Some(self.sessions.remove(index).display_name)
    }

    /// Display name bound to a connection
    pub fn name_of(&self, connection_id: ConnectionId) -> Option<&str> {
        self.sessions
            .iter()
            .find(|s| s.connection_id == connection_id)
            .map(|s| s.display_name.as_str())
    }

    /// First connection bound to the given display name
    pub fn connection_of(&self, display_name: &str) -> Option<ConnectionId> {
        self.sessions
            .iter()
            .find(|s| s.display_name == display_name)
            .map(|s| s.connection_id)
    }

    /// Snapshot of all bound display names, in registry order
    pub fn all_names(&self) -> Vec<String> {
        self.sessions
            .iter()
            .map(|s| s.display_name.clone())
            .collect()
    }

    /// Number of joined connections
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn position(&self, connection_id: ConnectionId) -> Option<usize> {
        self.sessions
            .iter()
            .position(|s| s.connection_id == connection_id)
    }
}
