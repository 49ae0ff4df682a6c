//! WebSocket Chat Relay Library
//!
//! A chat relay built with tokio-tungstenite: clients join under a display
//! name, see who is online, and exchange public or `@name` private messages.
//!
//! # Features
//! - WebSocket connection handling
//! - Display names and live roster (`users`, `userJoined`, `userLeft`)
//! - Public broadcast messages
//! - Private `@name text` messages delivered to sender and recipient
//! - "User not found" system notices
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor; it owns a `SessionController`
//!   (registry, presence, routing) and every connection's outbound channel
//! - Each connection has a `handler` task communicating with the server
//! - The core returns `Delivery` values; the actor fans them out
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{serve, ChatServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     let relay = tokio::spawn(ChatServer::new(cmd_rx).run());
//!     serve(listener, cmd_tx, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//!     let _ = relay.await;
//! }
//! ```

pub mod client;
pub mod clock;
pub mod error;
pub mod handler;
pub mod message;
pub mod presence;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AppError, SendError};
pub use handler::{handle_connection, serve};
pub use message::{ChatMessage, ClientMessage, Delivery, MessageKind, ServerMessage};
pub use registry::ConnectionRegistry;
pub use router::{classify, Classified};
pub use server::{ChatServer, ServerCommand};
pub use session::SessionController;
pub use types::ConnectionId;
