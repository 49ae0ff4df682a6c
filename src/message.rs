//! Message protocol definitions
//!
//! JSON frames shaped `{"event": ..., "data": ...}`, using Serde's adjacently
//! tagged enums for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::types::ConnectionId;

/// Author name used for messages synthesized by the relay
pub const SYSTEM_AUTHOR: &str = "System";

/// Client → Server message
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Announce (or replace) this connection's display name
    Join(String),
    /// Raw chat text, public or `@name ...` private
    Message(String),
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Connection accepted, identifier issued
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: String,
    },
    /// Current roster
    Users(Vec<String>),
    /// A display name joined
    UserJoined(String),
    /// A display name left
    UserLeft(String),
    /// Chat message (public, private or system)
    Message(ChatMessage),
    /// Join acknowledgment, sent to the joining connection only
    Join(String),
    /// Inbound frame could not be decoded
    Error { message: String },
}

/// How a chat message was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Public,
    Private,
    System,
}

/// A routed chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub author: String,
    pub body: String,
    /// RFC 3339 UTC timestamp stamped by the relay
    pub sent_at: String,
    pub kind: MessageKind,
    /// Recipient display name, private messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ChatMessage {
    pub fn public(author: impl Into<String>, body: impl Into<String>, sent_at: String) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            sent_at,
            kind: MessageKind::Public,
            target: None,
        }
    }

    pub fn private(
        author: impl Into<String>,
        body: impl Into<String>,
        target: impl Into<String>,
        sent_at: String,
    ) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            sent_at,
            kind: MessageKind::Private,
            target: Some(target.into()),
        }
    }

    pub fn system(body: impl Into<String>, sent_at: String) -> Self {
        Self {
            author: SYSTEM_AUTHOR.to_string(),
            body: body.into(),
            sent_at,
            kind: MessageKind::System,
            target: None,
        }
    }
}

/// An outbound event together with its audience
///
/// Produced by the core, carried out by the relay actor.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Every connected connection, joined or not
    Broadcast(ServerMessage),
    /// A single connection
    Unicast(ConnectionId, ServerMessage),
}

impl Delivery {
    pub fn message(&self) -> &ServerMessage {
        match self {
            Delivery::Broadcast(msg) | Delivery::Unicast(_, msg) => msg,
        }
    }
}
