//! Error types for the relay
//!
//! Defines application-level errors and mailbox delivery errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// All failures are handled at the connection boundary; none of these
/// propagate across connections.
#[derive(Debug, Error)]
pub enum AppError {
    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Listen address could not be parsed
    #[error("invalid listen address: {0}")]
    InvalidListenAddr(#[from] std::net::AddrParseError),

    /// The hub's intake channel is closed (hub task gone)
    #[error("hub closed")]
    HubClosed,
}

/// Mailbox delivery errors
///
/// Returned by the non-blocking delivery path; both variants cause the
/// hub to drop the recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The mailbox is at capacity (slow receiver)
    #[error("mailbox full")]
    MailboxFull,

    /// The mailbox receiver has been dropped
    #[error("mailbox closed")]
    MailboxClosed,
}
