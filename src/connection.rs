//! Connection struct definition
//!
//! Represents one live client session: identity plus the sending half of
//! its bounded outbound mailbox.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::DeliveryError;
use crate::message::Message;
use crate::types::ConnectionId;

/// One live client session
///
/// The hub's registry holds the only `Sender` for the mailbox, so removing
/// a connection from the registry closes the mailbox and lets the outbound
/// pump observe closure.
#[derive(Debug)]
pub struct Connection {
    /// Server-assigned identifier, session-scoped
    pub id: ConnectionId,
    /// Client-supplied display name
    pub username: String,
    /// Channel this connection is subscribed to
    pub channel: String,
    /// Sending half of the outbound mailbox
    sender: mpsc::Sender<Message>,
}

impl Connection {
    /// Create a new connection with the given identity and mailbox sender
    pub fn new(
        id: ConnectionId,
        username: String,
        channel: String,
        sender: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            id,
            username,
            channel,
            sender,
        }
    }

    /// Attempt a non-blocking delivery into the mailbox
    ///
    /// Never waits: a full mailbox is reported so the hub can drop the
    /// connection instead of stalling fan-out for other recipients.
    pub fn try_deliver(&self, message: Message) -> Result<(), DeliveryError> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::MailboxFull,
            TrySendError::Closed(_) => DeliveryError::MailboxClosed,
        })
    }
}
