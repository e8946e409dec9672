//! Basic type definitions for the relay
//!
//! Provides the `ConnectionId` newtype: a UUID-based identifier assigned
//! to each connection at accept time, valid for the session only.

use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe identification of live connections.
/// Implements Hash and Eq for use as HashMap keys. A reconnect always
/// gets a fresh id; ids are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
