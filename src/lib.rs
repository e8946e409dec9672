//! Real-time WebSocket Message Relay Library
//!
//! Clients connect over WebSocket, join a named channel, and receive every
//! message broadcast to that channel, including traffic injected by a
//! periodic simulator.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Hub` is the central actor owning the connection registry; register,
//!   unregister, and broadcast are all drained from one ordered intake, so
//!   membership changes never race fan-out
//! - Each connection runs two tasks: an inbound pump feeding the hub and an
//!   outbound pump draining the connection's bounded mailbox
//! - Delivery is non-blocking: a connection whose mailbox is full is
//!   dropped rather than allowed to stall the broadcast
//! - A simulator task keeps the `general` channel alive on a fixed interval
//!
//! The HTTP surface (health, stats, landing page) is plain axum glue around
//! the hub's `connection_count()`.
//!
//! # Example
//! ```ignore
//! use chat_relay::{build_router, AppState, Hub, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::from_env().unwrap();
//!     let (hub, handle) = Hub::new(config.intake_capacity);
//!     tokio::spawn(hub.run());
//!
//!     let app = build_router(AppState { hub: handle, config: config.clone() });
//!     let listener = tokio::net::TcpListener::bind(config.listen_addr).await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod app_state;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod hub;
pub mod message;
pub mod routes;
pub mod simulator;
pub mod types;

// Re-export main types for convenience
pub use app_state::AppState;
pub use config::RelayConfig;
pub use connection::Connection;
pub use error::{AppError, DeliveryError};
pub use hub::{Hub, HubCommand, HubHandle};
pub use message::{Message, MessageKind};
pub use routes::build_router;
pub use types::ConnectionId;
