//! Relay server entry point
//!
//! Starts the hub actor, the simulator, and the axum HTTP/WebSocket server.

use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::{build_router, AppState, Hub, RelayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = RelayConfig::from_env()?;

    // Start the hub actor
    let (hub, handle) = Hub::new(config.intake_capacity);
    tokio::spawn(hub.run());

    // Start simulated traffic for the general channel
    tokio::spawn(chat_relay::simulator::run(
        handle.clone(),
        config.simulation_interval(),
    ));

    let state = AppState {
        hub: handle,
        config: config.clone(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "relay server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
