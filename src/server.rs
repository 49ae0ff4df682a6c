//! ChatServer Actor implementation
//!
//! The central actor owning the session controller and the outbound channel
//! of every live connection. Commands are processed one at a time, so each
//! registry change and the broadcasts derived from it happen as one unit.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::clock::{Clock, SystemClock};
use crate::message::{Delivery, ServerMessage};
use crate::session::SessionController;
use crate::types::ConnectionId;

/// Commands sent from connection handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection accepted
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Connection closed
    Disconnect { connection_id: ConnectionId },
    /// Connection announced a display name
    Join {
        connection_id: ConnectionId,
        display_name: String,
    },
    /// Chat text from a connection
    Message {
        connection_id: ConnectionId,
        text: String,
    },
}

/// The main ChatServer actor
pub struct ChatServer<C: Clock = SystemClock> {
    /// All live connections, joined or not
    clients: HashMap<ConnectionId, Client>,
    /// Registry and routing core
    sessions: SessionController<C>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer<SystemClock> {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self::with_sessions(receiver, SessionController::new())
    }
}

impl<C: Clock> ChatServer<C> {
    /// Create a ChatServer around an existing session controller
    pub fn with_sessions(
        receiver: mpsc::Receiver<ServerCommand>,
        sessions: SessionController<C>,
    ) -> Self {
        Self {
            clients: HashMap::new(),
            sessions,
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped. The registry is discarded when the loop ends.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        let deliveries = match cmd {
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                self.clients
                    .insert(connection_id, Client::new(connection_id, sender));
                debug!("Total connections: {}", self.clients.len());
                self.sessions.on_connect(connection_id)
            }
            ServerCommand::Disconnect { connection_id } => {
                self.clients.remove(&connection_id);
                debug!("Total connections: {}", self.clients.len());
                self.sessions.on_disconnect(connection_id)
            }
            ServerCommand::Join {
                connection_id,
                display_name,
            } => {
                if !self.is_live(connection_id) {
                    return;
                }
                self.sessions.on_join(connection_id, display_name)
            }
            ServerCommand::Message {
                connection_id,
                text,
            } => {
                if !self.is_live(connection_id) {
                    return;
                }
                self.sessions.on_message(connection_id, &text)
            }
        };

        for delivery in deliveries {
            self.deliver(delivery);
        }
    }

    /// Only registered, not yet disconnected connections may touch the registry
    fn is_live(&self, connection_id: ConnectionId) -> bool {
        let live = self.clients.contains_key(&connection_id);
        if !live {
            debug!("Ignoring command from closed connection {}", connection_id);
        }
        live
    }

    /// Hand a delivery to the affected connections' write tasks
    fn deliver(&self, delivery: Delivery) {
        match delivery {
            Delivery::Broadcast(msg) => {
                debug!("Broadcasting to {} connections", self.clients.len());
                for client in self.clients.values() {
                    self.send_to(client, msg.clone());
                }
            }
            Delivery::Unicast(connection_id, msg) => match self.clients.get(&connection_id) {
                Some(client) => self.send_to(client, msg),
                None => debug!("Connection {} gone, dropping message", connection_id),
            },
        }
    }

    fn send_to(&self, client: &Client, msg: ServerMessage) {
        if let Err(e) = client.send(msg) {
            warn!("Dropped message for {}: {}", client.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ChatMessage, MessageKind};

    async fn connect(
        cmd_tx: &mpsc::Sender<ServerCommand>,
    ) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let connection_id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(32);
        cmd_tx
            .send(ServerCommand::Connect {
                connection_id,
                sender: tx,
            })
            .await
            .unwrap();
        (connection_id, rx)
    }

    async fn join(cmd_tx: &mpsc::Sender<ServerCommand>, connection_id: ConnectionId, name: &str) {
        cmd_tx
            .send(ServerCommand::Join {
                connection_id,
                display_name: name.to_string(),
            })
            .await
            .unwrap();
    }

    /// Receive until `stop` arrives or the channel closes
    async fn recv_until(
        rx: &mut mpsc::Receiver<ServerMessage>,
        stop: &ServerMessage,
    ) -> Vec<ServerMessage> {
        let mut seen = Vec::new();
        while let Some(msg) = rx.recv().await {
            let done = &msg == stop;
            seen.push(msg);
            if done {
                break;
            }
        }
        seen
    }

    fn chats(msgs: Vec<ServerMessage>) -> Vec<ChatMessage> {
        msgs.into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::Message(chat) => Some(chat),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_join_broadcasts_to_all_connections() {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(ChatServer::new(cmd_rx).run());

        let (alice, mut alice_rx) = connect(&cmd_tx).await;
        let (_anon, mut anon_rx) = connect(&cmd_tx).await;
        join(&cmd_tx, alice, "alice").await;

        let users = ServerMessage::Users(vec!["alice".into()]);
        let joined = ServerMessage::UserJoined("alice".into());

        assert_eq!(alice_rx.recv().await, Some(users.clone()));
        assert_eq!(alice_rx.recv().await, Some(joined.clone()));
        assert_eq!(
            alice_rx.recv().await,
            Some(ServerMessage::Join("alice joined the chat".into()))
        );

        assert_eq!(anon_rx.recv().await, Some(users));
        assert_eq!(anon_rx.recv().await, Some(joined));
        assert!(anon_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_private_message_reaches_only_two_parties() {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(ChatServer::new(cmd_rx).run());

        let (alice, mut alice_rx) = connect(&cmd_tx).await;
        let (bob, mut bob_rx) = connect(&cmd_tx).await;
        let (carol, mut carol_rx) = connect(&cmd_tx).await;
        join(&cmd_tx, alice, "alice").await;
        join(&cmd_tx, bob, "bob").await;
        join(&cmd_tx, carol, "carol").await;

        cmd_tx
            .send(ServerCommand::Message {
                connection_id: alice,
                text: "@bob hi there".into(),
            })
            .await
            .unwrap();
        // Commands are processed in order, so once this disconnect is seen
        // the private message has already been fanned out.
        cmd_tx
            .send(ServerCommand::Disconnect { connection_id: carol })
            .await
            .unwrap();

        let left = ServerMessage::UserLeft("carol".into());
        let alice_msgs = chats(recv_until(&mut alice_rx, &left).await);
        let bob_msgs = chats(recv_until(&mut bob_rx, &left).await);
        let carol_msgs = chats(recv_until(&mut carol_rx, &left).await);

        assert_eq!(alice_msgs.len(), 1);
        assert_eq!(bob_msgs.len(), 1);
        assert!(carol_msgs.is_empty());
        assert_eq!(alice_msgs[0].kind, MessageKind::Private);
        assert_eq!(bob_msgs[0].body, "hi there");
        assert_eq!(bob_msgs[0].target.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_disconnect_removes_client_before_broadcast() {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(ChatServer::new(cmd_rx).run());

        let (alice, mut alice_rx) = connect(&cmd_tx).await;
        let (bob, mut bob_rx) = connect(&cmd_tx).await;
        join(&cmd_tx, alice, "alice").await;
        join(&cmd_tx, bob, "bob").await;

        cmd_tx
            .send(ServerCommand::Disconnect { connection_id: bob })
            .await
            .unwrap();

        let seen = recv_until(&mut alice_rx, &ServerMessage::UserLeft("bob".into())).await;
        assert_eq!(seen[seen.len() - 2], ServerMessage::Users(vec!["alice".into()]));

        // bob's channel was dropped by the actor; nothing after the join ack
        let bob_seen = recv_until(&mut bob_rx, &ServerMessage::UserLeft("bob".into())).await;
        assert!(!bob_seen.contains(&ServerMessage::UserLeft("bob".into())));
    }

    #[tokio::test]
    async fn test_join_after_disconnect_is_ignored() {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(ChatServer::new(cmd_rx).run());

        let (_observer, mut observer_rx) = connect(&cmd_tx).await;
        let (ghost, _ghost_rx) = connect(&cmd_tx).await;
        cmd_tx
            .send(ServerCommand::Disconnect { connection_id: ghost })
            .await
            .unwrap();
        join(&cmd_tx, ghost, "ghost").await;
        cmd_tx
            .send(ServerCommand::Message {
                connection_id: ghost,
                text: "still here".into(),
            })
            .await
            .unwrap();

        let (carol, _carol_rx) = connect(&cmd_tx).await;
        join(&cmd_tx, carol, "carol").await;

        assert_eq!(
            observer_rx.recv().await,
            Some(ServerMessage::Users(vec!["carol".into()]))
        );
        assert_eq!(
            observer_rx.recv().await,
            Some(ServerMessage::UserJoined("carol".into()))
        );
    }

    #[tokio::test]
    async fn test_commands_from_unregistered_connection_are_ignored() {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(ChatServer::new(cmd_rx).run());

        let (alice, mut alice_rx) = connect(&cmd_tx).await;
        let stranger = ConnectionId::new();
        join(&cmd_tx, stranger, "stranger").await;
        join(&cmd_tx, alice, "alice").await;
        cmd_tx
            .send(ServerCommand::Message {
                connection_id: alice,
                text: "@stranger hello".into(),
            })
            .await
            .unwrap();

        let ack = ServerMessage::Join("alice joined the chat".into());
        let seen = recv_until(&mut alice_rx, &ack).await;
        assert_eq!(seen[0], ServerMessage::Users(vec!["alice".into()]));

        let notice = chats(vec![alice_rx.recv().await.unwrap()]);
        assert_eq!(notice.len(), 1);
        assert_eq!(notice[0].kind, MessageKind::System);
        assert_eq!(notice[0].body, "User stranger not found.");
    }
}
