//! Message routing
//!
//! Classifies raw chat text as public or private and resolves who receives
//! it. Text of the form `@name rest` is a private message to `name`;
//! anything else is broadcast.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::clock::{format_timestamp, Clock};
use crate::message::{ChatMessage, Delivery, ServerMessage};
use crate::registry::ConnectionRegistry;
use crate::types::ConnectionId;

/// `@<word chars> <whitespace> <rest of line>`; word chars are ASCII only.
/// `.` stops at a newline, so multi-line text never matches.
static PRIVATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A@((?-u:\w)+)\s+(.*)\z").unwrap());

/// Result of classifying raw chat text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'a> {
    Public,
    Private { target: &'a str, body: &'a str },
}

/// Classify raw chat text
pub fn classify(raw: &str) -> Classified<'_> {
    let Some(caps) = PRIVATE_PATTERN.captures(raw) else {
        return Classified::Public;
    };
    let (_, [target, body]) = caps.extract();
    Classified::Private { target, body }
}

/// Route a chat message from `sender`
///
/// Returns nothing when the sender has not joined. A private message whose
/// target is unknown turns into a system notice for the sender.
pub fn route<C: Clock + ?Sized>(
    registry: &ConnectionRegistry,
    clock: &C,
    sender: ConnectionId,
    raw: &str,
) -> Vec<Delivery> {
    let Some(author) = registry.name_of(sender) else {
        debug!("Dropping message from unjoined connection {}", sender);
        return Vec::new();
    };

    match classify(raw) {
        Classified::Private { target, body } => {
            let sent_at = format_timestamp(clock.now());

            let Some(target_id) = registry.connection_of(target) else {
                debug!("'{}' messaged unknown user '{}'", author, target);
                let notice = ChatMessage::system(format!("User {} not found.", target), sent_at);
                return vec![Delivery::Unicast(sender, ServerMessage::Message(notice))];
            };

            debug!("Private message from '{}' to '{}'", author, target);
            let msg = ServerMessage::Message(ChatMessage::private(author, body, target, sent_at));

            if target_id == sender {
                return vec![Delivery::Unicast(sender, msg)];
            }
            vec![
                Delivery::Unicast(sender, msg.clone()),
                Delivery::Unicast(target_id, msg),
            ]
        }
        Classified::Public => {
            let sent_at = format_timestamp(clock.now());
            vec![Delivery::Broadcast(ServerMessage::Message(
                ChatMessage::public(author, raw, sent_at),
            ))]
        }
    }
}
