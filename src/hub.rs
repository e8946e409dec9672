//! Hub actor implementation
//!
//! The central actor owning the registry of live connections. All registry
//! mutation and fan-out happens inside a single coordinating task fed by one
//! ordered intake channel, so registration, unregistration, and broadcast
//! can never race each other. The only state shared outside that task is a
//! read-only roster behind an RwLock, serving size and membership queries.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::AppError;
use crate::message::Message;
use crate::types::ConnectionId;

/// Commands submitted to the hub's intake channel
#[derive(Debug)]
pub enum HubCommand {
    /// New connection to add to the registry
    Register(Connection),
    /// Connection to remove; a no-op if already absent
    Unregister(ConnectionId),
    /// Message to fan out to matching connections
    Broadcast(Message),
}

/// Read-only mirror of the registry: connection id to channel name.
/// Written only by the coordinating task.
type Roster = Arc<RwLock<HashMap<ConnectionId, String>>>;

/// Cloneable handle for submitting commands and reading the roster
///
/// Constructed once by [`Hub::new`] and passed to every collaborator that
/// needs the hub: route handlers, connection pumps, the simulator.
#[derive(Debug, Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
    roster: Roster,
}

impl HubHandle {
    /// Submit a connection for registration
    pub async fn register(&self, connection: Connection) -> Result<(), AppError> {
        self.send(HubCommand::Register(connection)).await
    }

    /// Request removal of a connection
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), AppError> {
        self.send(HubCommand::Unregister(id)).await
    }

    /// Submit a message for fan-out
    pub async fn broadcast(&self, message: Message) -> Result<(), AppError> {
        self.send(HubCommand::Broadcast(message)).await
    }

    /// Point-in-time count of registered connections
    pub async fn connection_count(&self) -> usize {
        self.roster.read().await.len()
    }

    /// Whether any registered connection is subscribed to `channel`
    pub async fn has_subscriber(&self, channel: &str) -> bool {
        self.roster.read().await.values().any(|c| c == channel)
    }

    async fn send(&self, command: HubCommand) -> Result<(), AppError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| AppError::HubClosed)
    }
}

/// The hub actor
///
/// Owns the registry exclusively; processes one command at a time from the
/// intake channel. Fan-out uses only non-blocking mailbox sends, so no
/// command ever blocks the coordinating task.
pub struct Hub {
    /// Registered connections, keyed by id
    connections: HashMap<ConnectionId, Connection>,
    /// Command intake receiver
    receiver: mpsc::Receiver<HubCommand>,
    /// Shared id-to-channel mirror for read-only queries
    roster: Roster,
}

impl Hub {
    /// Create a hub and the handle used to reach it
    pub fn new(intake_capacity: usize) -> (Self, HubHandle) {
        let (sender, receiver) = mpsc::channel(intake_capacity);
        let roster: Roster = Arc::new(RwLock::new(HashMap::new()));
        let hub = Self {
            connections: HashMap::new(),
            receiver,
            roster: Arc::clone(&roster),
        };
        (hub, HubHandle { sender, roster })
    }

    /// Run the hub event loop
    ///
    /// Continuously receives and processes commands until all handles are
    /// dropped.
    pub async fn run(mut self) {
        info!("hub started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("hub shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Register(connection) => {
                self.handle_register(connection).await;
            }
            HubCommand::Unregister(id) => {
                self.handle_unregister(id).await;
            }
            HubCommand::Broadcast(message) => {
                self.handle_broadcast(message).await;
            }
        }
    }

    /// Handle a new registration
    ///
    /// The welcome notice is delivered through the same non-blocking path
    /// as broadcasts; if it cannot be delivered the connection is torn
    /// down immediately rather than left half-registered.
    async fn handle_register(&mut self, connection: Connection) {
        let id = connection.id;
        let channel = connection.channel.clone();

        self.roster.write().await.insert(id, channel.clone());
        let delivery = connection.try_deliver(Message::welcome(id, &channel));
        self.connections.insert(id, connection);

        info!(
            %id,
            channel = %channel,
            total = self.connections.len(),
            "connection registered"
        );

        if let Err(e) = delivery {
            warn!(%id, error = %e, "welcome undeliverable");
            self.remove_connection(id).await;
        }
    }

    /// Handle unregistration; a no-op for already-absent connections
    async fn handle_unregister(&mut self, id: ConnectionId) {
        self.remove_connection(id).await;
    }

    /// Fan a message out to every matching connection
    ///
    /// An empty message channel addresses all connections. Recipients whose
    /// mailbox refuses the message are dropped after the sweep; a slow
    /// consumer never stalls delivery to the others.
    async fn handle_broadcast(&mut self, message: Message) {
        let mut stale = Vec::new();

        for connection in self.connections.values() {
            if !message.channel.is_empty() && connection.channel != message.channel {
                continue;
            }
            if let Err(e) = connection.try_deliver(message.clone()) {
                warn!(id = %connection.id, error = %e, "dropping unreachable connection");
                stale.push(connection.id);
            }
        }

        for id in stale {
            self.remove_connection(id).await;
        }
    }

    /// Remove a connection from registry and roster
    ///
    /// The registry holds the mailbox's only sender, so removal closes the
    /// mailbox; the outbound pump observes closure and terminates the
    /// transport. Idempotent by construction.
    async fn remove_connection(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.remove(&id) {
            self.roster.write().await.remove(&id);
            info!(
                %id,
                username = %connection.username,
                channel = %connection.channel,
                total = self.connections.len(),
                "connection unregistered"
            );
        } else {
            debug!(%id, "unregister for absent connection ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{current_timestamp, MessageKind};

    fn spawn_hub() -> HubHandle {
        let (hub, handle) = Hub::new(64);
        tokio::spawn(hub.run());
        handle
    }

    fn make_connection(
        username: &str,
        channel: &str,
        capacity: usize,
    ) -> (Connection, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = Connection::new(
            ConnectionId::new(),
            username.to_string(),
            channel.to_string(),
            tx,
        );
        (conn, rx)
    }

    fn chat(username: &str, content: &str, channel: &str) -> Message {
        Message {
            kind: MessageKind::Chat,
            username: username.to_string(),
            user_id: None,
            content: content.to_string(),
            timestamp: current_timestamp(),
            channel: channel.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_delivers_one_welcome_with_assigned_id() {
        let hub = spawn_hub();
        let (conn, mut rx) = make_connection("Alice", "general", 8);
        let id = conn.id;

        hub.register(conn).await.unwrap();

        let welcome = rx.recv().await.unwrap();
        assert_eq!(welcome.kind, MessageKind::UserConnected);
        assert_eq!(welcome.user_id, Some(id.to_string()));
        assert_eq!(welcome.channel, "general");

        // Welcome received means the registration is fully processed.
        assert_eq!(hub.connection_count().await, 1);
        assert!(hub.has_subscriber("general").await);
        assert!(!hub.has_subscriber("random").await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_filters_by_channel() {
        let hub = spawn_hub();
        let (alice, mut alice_rx) = make_connection("Alice", "general", 8);
        let (bob, mut bob_rx) = make_connection("Bob", "general", 8);
        let (carol, mut carol_rx) = make_connection("Carol", "random", 8);

        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();
        hub.register(carol).await.unwrap();
        alice_rx.recv().await.unwrap();
        bob_rx.recv().await.unwrap();
        carol_rx.recv().await.unwrap();

        hub.broadcast(chat("Alice", "hi", "general")).await.unwrap();

        let received = bob_rx.recv().await.unwrap();
        assert_eq!(received.username, "Alice");
        assert_eq!(received.channel, "general");
        assert_eq!(received.content, "hi");

        // Self-delivery: the sender's connection matches its own channel.
        let echoed = alice_rx.recv().await.unwrap();
        assert_eq!(echoed.content, "hi");

        // Bob's receipt orders after Carol's delivery decision.
        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_empty_channel_reaches_all() {
        let hub = spawn_hub();
        let (alice, mut alice_rx) = make_connection("Alice", "general", 8);
        let (carol, mut carol_rx) = make_connection("Carol", "random", 8);

        hub.register(alice).await.unwrap();
        hub.register(carol).await.unwrap();
        alice_rx.recv().await.unwrap();
        carol_rx.recv().await.unwrap();

        hub.broadcast(chat("System", "announcement", "")).await.unwrap();

        assert_eq!(alice_rx.recv().await.unwrap().content, "announcement");
        assert_eq!(carol_rx.recv().await.unwrap().content, "announcement");
    }

    #[tokio::test]
    async fn test_full_mailbox_drops_connection_exactly_once() {
        let hub = spawn_hub();
        // Capacity 1: the welcome fills the mailbox and is never drained.
        let (slow, mut slow_rx) = make_connection("Slow", "general", 1);
        let (probe, mut probe_rx) = make_connection("Probe", "general", 8);

        hub.register(slow).await.unwrap();
        hub.register(probe).await.unwrap();
        probe_rx.recv().await.unwrap();

        hub.broadcast(chat("Probe", "first", "general")).await.unwrap();
        assert_eq!(probe_rx.recv().await.unwrap().content, "first");

        // Receipt of the second broadcast orders after the overflow sweep
        // of the first, so the drop is fully processed by now.
        hub.broadcast(chat("Probe", "second", "general")).await.unwrap();
        assert_eq!(probe_rx.recv().await.unwrap().content, "second");
        assert_eq!(hub.connection_count().await, 1);

        // Its mailbox still holds the welcome, then observes closure.
        let welcome = slow_rx.recv().await.unwrap();
        assert_eq!(welcome.kind, MessageKind::UserConnected);
        assert!(slow_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_register_with_full_mailbox_tears_down() {
        let hub = spawn_hub();
        let (tx, mut rx) = mpsc::channel(1);
        // Pre-fill so the welcome cannot be delivered.
        tx.try_send(chat("x", "filler", "general")).unwrap();
        let conn = Connection::new(
            ConnectionId::new(),
            "Full".to_string(),
            "general".to_string(),
            tx,
        );

        hub.register(conn).await.unwrap();

        // Filler drains, then the closed mailbox confirms the teardown.
        rx.recv().await.unwrap();
        assert!(rx.recv().await.is_none());
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let hub = spawn_hub();
        let (alice, mut alice_rx) = make_connection("Alice", "general", 8);
        let (bob, mut bob_rx) = make_connection("Bob", "general", 8);
        let alice_id = alice.id;

        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();
        alice_rx.recv().await.unwrap();
        bob_rx.recv().await.unwrap();

        hub.unregister(alice_id).await.unwrap();
        hub.unregister(alice_id).await.unwrap();

        hub.broadcast(chat("Bob", "still here", "general")).await.unwrap();
        assert_eq!(bob_rx.recv().await.unwrap().content, "still here");

        assert_eq!(hub.connection_count().await, 1);
        let welcome = alice_rx.recv().await.unwrap();
        assert_eq!(welcome.kind, MessageKind::UserConnected);
        assert!(alice_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_count_tracks_registrations_minus_unregistrations() {
        let hub = spawn_hub();
        let mut receivers = Vec::new();
        let mut ids = Vec::new();

        for i in 0..3 {
            let (conn, rx) = make_connection(&format!("user{i}"), "counting", 8);
            ids.push(conn.id);
            hub.register(conn).await.unwrap();
            receivers.push(rx);
        }
        for rx in &mut receivers {
            rx.recv().await.unwrap();
        }
        assert_eq!(hub.connection_count().await, 3);

        hub.unregister(ids[0]).await.unwrap();
        hub.broadcast(chat("sync", "tick", "counting")).await.unwrap();
        assert_eq!(receivers[1].recv().await.unwrap().content, "tick");

        assert_eq!(hub.connection_count().await, 2);
    }
}
