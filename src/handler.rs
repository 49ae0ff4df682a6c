//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! frame decoding, and bidirectional communication with the ChatServer.

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Outbound queue capacity per connection
pub const CLIENT_BUFFER_SIZE: usize = 32;

/// Accept connections until `shutdown` resolves
///
/// Each connection runs on its own task. On shutdown every connection task
/// is aborted and `cmd_tx` is dropped, so once the other senders are gone
/// the ChatServer loop ends and its registry is discarded.
pub async fn serve<F>(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down, closing {} connections", connections.len());
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    let cmd_tx = cmd_tx.clone();
                    connections.spawn(async move {
                        if let Err(e) = handle_connection(stream, cmd_tx).await {
                            error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
            Some(_) = connections.join_next() => {}
        }
    }

    connections.shutdown().await;
}

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers the connection with the
/// ChatServer, pumps frames both ways, and reports the disconnect.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = ConnectionId::new();
    info!("Connection {} opened from {}", connection_id, peer_addr);

    // Server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(CLIENT_BUFFER_SIZE);

    // Greeting goes out before registration so it is always the first frame
    let connected_msg = ServerMessage::Connected {
        connection_id: connection_id.to_string(),
    };
    let json = serde_json::to_string(&connected_msg)?;
    ws_sender.send(Message::Text(json.into())).await?;

    if cmd_tx
        .send(ServerCommand::Connect {
            connection_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - server closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Read half (WebSocket -> ServerCommand)
    let read = async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = client_message_to_command(connection_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read loop for {}", connection_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid frame from {}: {}", connection_id, e);
                        let _ = msg_tx.try_send(ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        });
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!("Ping from {}", connection_id);
                }
                Ok(_) => {
                    // Binary, pong and raw frames carry no chat events
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
    };

    // Write half (ServerMessage -> WebSocket)
    let write = async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write loop");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }

        let _ = ws_sender.close().await;
    };

    // Both halves run on this task; the one still pending is dropped here,
    // so no frame from this connection can follow the Disconnect below.
    tokio::select! {
        _ = read => {
            debug!("Read loop completed for {}", connection_id);
        }
        _ = write => {
            debug!("Write loop completed for {}", connection_id);
        }
    }

    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!("Connection {} closed", connection_id);

    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(connection_id: ConnectionId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::Join(display_name) => ServerCommand::Join {
            connection_id,
            display_name,
        },
        ClientMessage::Message(text) => ServerCommand::Message {
            connection_id,
            text,
        },
    }
}
