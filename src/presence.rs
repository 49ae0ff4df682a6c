//! Presence notifications
//!
//! Roster and join/leave events derived from the registry. Callers invoke
//! these right after the mutation, while still holding exclusive access.

use crate::message::{Delivery, ServerMessage};
use crate::registry::ConnectionRegistry;

/// Events announcing that `display_name` joined
///
/// Broadcasts the roster (taken after the bind) followed by `userJoined`.
pub fn notify_joined(registry: &ConnectionRegistry, display_name: &str) -> Vec<Delivery> {
    vec![
        Delivery::Broadcast(ServerMessage::Users(registry.all_names())),
        Delivery::Broadcast(ServerMessage::UserJoined(display_name.to_string())),
    ]
}

/// Events announcing that `display_name` left
///
/// Broadcasts the roster (taken after the unbind) followed by `userLeft`.
pub fn notify_left(registry: &ConnectionRegistry, display_name: &str) -> Vec<Delivery> {
    vec![
        Delivery::Broadcast(ServerMessage::Users(registry.all_names())),
        Delivery::Broadcast(ServerMessage::UserLeft(display_name.to_string())),
    ]
}
