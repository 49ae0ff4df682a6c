//! Error types for the chat relay
//!
//! The routing core has no failure paths; these cover the transport
//! around it. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Connection-level errors
///
/// Any of these ends the affected connection only. The relay keeps running.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command channel to the relay actor is closed
    #[error("Channel send error")]
    ChannelSend,
}

/// Outbound delivery errors
///
/// Fan-out is fire-and-forget, so these are only logged.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection's outbound queue is full
    #[error("Channel full")]
    ChannelFull,
}
