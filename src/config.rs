//! Relay configuration loaded from environment variables
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with sensible defaults.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;

/// Display name used when a client supplies none
pub const DEFAULT_USERNAME: &str = "Anonymous";

/// Channel used when a client supplies none; also the simulator's target
pub const DEFAULT_CHANNEL: &str = "general";

/// Top-level relay configuration
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the server to (e.g. `0.0.0.0:8080`)
    pub listen_addr: SocketAddr,

    /// Capacity of each connection's outbound mailbox; exceeding it is the
    /// sole trigger for involuntary disconnection of a slow receiver
    pub mailbox_capacity: usize,

    /// Capacity of the hub's command intake channel
    pub intake_capacity: usize,

    /// Seconds between candidate simulated broadcasts
    pub simulation_interval_secs: u64,
}

impl RelayConfig {
    /// Loads configuration from environment variables
    ///
    /// Falls back to defaults when a variable is not set or unparseable.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        Ok(Self {
            listen_addr,
            mailbox_capacity: parse_env("MAILBOX_CAPACITY", 256),
            intake_capacity: parse_env("INTAKE_CAPACITY", 256),
            simulation_interval_secs: parse_env("SIMULATION_INTERVAL_SECS", 10),
        })
    }

    /// Interval between simulator ticks
    pub fn simulation_interval(&self) -> Duration {
        Duration::from_secs(self.simulation_interval_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
