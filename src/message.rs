//! Wire message definitions
//!
//! A single JSON record shape is used in both directions. Clients need
//! only supply `type` and `content`; every identity, channel, and timestamp
//! field is overwritten with server-authoritative values at intake.

use serde::{Deserialize, Serialize};

use crate::types::ConnectionId;

/// Display name attached to server-originated notices
pub const SYSTEM_USERNAME: &str = "System";

/// Message kind tag
///
/// `Chat` is a regular relayed message; `UserConnected` is the system
/// notice delivered to a connection when it joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Regular chat message
    #[serde(rename = "message")]
    Chat,
    /// Welcome notice carrying the server-assigned connection id
    UserConnected,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Chat
    }
}

/// A relayed message, immutable once stamped
///
/// `user_id` is present only on server-originated records; an empty
/// `channel` addresses every connection and is omitted on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel: String,
}

impl Message {
    /// Build the welcome notice delivered on registration
    ///
    /// Addressed to the connection's own channel and carrying its
    /// server-assigned identifier.
    pub fn welcome(id: ConnectionId, channel: &str) -> Self {
        Self {
            kind: MessageKind::UserConnected,
            username: SYSTEM_USERNAME.to_string(),
            user_id: Some(id.to_string()),
            content: "Welcome to the chat!".to_string(),
            timestamp: current_timestamp(),
            channel: channel.to_string(),
        }
    }
}

/// Current time as an RFC 3339 string, assigned at the point of intake
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
