//! Chat relay binary
//!
//! Usage: `chat_relay [ADDR]` (default `127.0.0.1:8080`). Ctrl+C stops
//! accepting, closes every connection and waits for the relay actor to exit.

use std::env;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chat_relay::{serve, ChatServer};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Capacity of the handler → actor command queue
const CHANNEL_BUFFER_SIZE: usize = 256;

/// How long the actor gets to drain after the listener stops
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides, e.g. RUST_LOG=chat_relay=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let listener = TcpListener::bind(&addr).await?;
    info!("Chat relay listening on {}", addr);

    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let relay = tokio::spawn(ChatServer::new(cmd_rx).run());

    serve(listener, cmd_tx, shutdown_signal()).await;

    match timeout(SHUTDOWN_TIMEOUT, relay).await {
        Ok(Ok(())) => info!("Chat relay stopped"),
        Ok(Err(e)) => error!("Relay actor failed: {}", e),
        Err(_) => warn!("Relay actor did not stop within {:?}", SHUTDOWN_TIMEOUT),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl+c: {}", e);
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
