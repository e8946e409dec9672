//! Shared application state injected into all Axum handlers.

use crate::config::RelayConfig;
use crate::hub::HubHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the hub's intake and roster
    pub hub: HubHandle,
    /// Loaded configuration
    pub config: RelayConfig,
}
