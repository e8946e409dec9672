//! WebSocket connection handler
//!
//! Upgrades the HTTP request into a WebSocket, registers a new connection
//! with the hub, and runs the two per-connection pumps: inbound
//! (transport to hub broadcast intake) and outbound (mailbox to transport).

use axum::extract::ws::{Message as WsFrame, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app_state::AppState;
use crate::config::{DEFAULT_CHANNEL, DEFAULT_USERNAME};
use crate::connection::Connection;
use crate::hub::HubHandle;
use crate::message::{current_timestamp, Message};
use crate::types::ConnectionId;

/// Optional query parameters on the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    username: Option<String>,
    channel: Option<String>,
}

impl ConnectParams {
    /// Display name, defaulting when missing or empty
    fn username(&self) -> String {
        self.username
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
    }

    /// Channel name, defaulting when missing or empty
    fn channel(&self) -> String {
        self.channel
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string())
    }
}

/// `GET /ws` — upgrade the HTTP connection to a WebSocket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    let mailbox_capacity = state.config.mailbox_capacity;
    ws.on_upgrade(move |socket| run_connection(socket, hub, params, mailbox_capacity))
}

/// Run one connection's lifecycle
///
/// Creates the identity and mailbox, registers with the hub, runs both
/// pumps, and submits exactly one unregistration when either pump ends.
async fn run_connection(
    socket: WebSocket,
    hub: HubHandle,
    params: ConnectParams,
    mailbox_capacity: usize,
) {
    let id = ConnectionId::new();
    let username = params.username();
    let channel = params.channel();

    let (ws_tx, ws_rx) = socket.split();
    let (mailbox_tx, mailbox_rx) = mpsc::channel(mailbox_capacity);

    // The registry keeps the only sender; unregistration closes the mailbox.
    let connection = Connection::new(id, username.clone(), channel.clone(), mailbox_tx);
    if let Err(e) = hub.register(connection).await {
        error!(%id, error = %e, "failed to register connection");
        return;
    }

    info!(%id, username = %username, channel = %channel, "client connected");

    let inbound = tokio::spawn(inbound_pump(ws_rx, hub.clone(), id, username, channel));
    let outbound = tokio::spawn(outbound_pump(mailbox_rx, ws_tx));

    tokio::select! {
        _ = inbound => {
            debug!(%id, "inbound pump completed");
        }
        _ = outbound => {
            debug!(%id, "outbound pump completed");
        }
    }

    let _ = hub.unregister(id).await;
    info!(%id, "client disconnected");
}

/// Overwrite client-supplied metadata with server-authoritative values
///
/// Clients cannot spoof identity, channel, or timestamp; only the kind and
/// content survive from the inbound record.
fn stamp(mut message: Message, username: &str, id: ConnectionId, channel: &str) -> Message {
    message.username = username.to_string();
    message.user_id = Some(id.to_string());
    message.channel = channel.to_string();
    message.timestamp = current_timestamp();
    message
}

/// Inbound pump: structured records from the transport into the hub
///
/// Stops on decode failure, close frame, stream end, or transport error;
/// the caller then drives unregistration.
async fn inbound_pump(
    mut ws_rx: SplitStream<WebSocket>,
    hub: HubHandle,
    id: ConnectionId,
    username: String,
    channel: String,
) {
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(WsFrame::Text(text)) => match serde_json::from_str::<Message>(&text) {
                Ok(record) => {
                    let message = stamp(record, &username, id, &channel);
                    info!(
                        channel = %message.channel,
                        username = %message.username,
                        content = %message.content,
                        "message received"
                    );
                    if hub.broadcast(message).await.is_err() {
                        debug!(%id, "hub closed, ending inbound pump");
                        break;
                    }
                }
                Err(e) => {
                    warn!(%id, error = %e, "undecodable record, closing connection");
                    break;
                }
            },
            Ok(WsFrame::Close(_)) => {
                debug!(%id, "client sent close frame");
                break;
            }
            Ok(_) => {
                // Binary, ping, pong: ignored (pong is sent automatically)
            }
            Err(e) => {
                error!(%id, error = %e, "websocket error");
                break;
            }
        }
    }
    debug!(%id, "inbound pump ended");
}

/// Outbound pump: mailbox messages onto the transport in receipt order
///
/// Mailbox closure (the hub dropped this connection) terminates the
/// transport with a close frame; a write error stops the pump immediately
/// and leaves teardown to the inbound pump's next read failure.
async fn outbound_pump(mut mailbox: mpsc::Receiver<Message>, mut ws_tx: SplitSink<WebSocket, WsFrame>) {
    while let Some(message) = mailbox.recv().await {
        match serde_json::to_string(&message) {
            Ok(json) => {
                if ws_tx.send(WsFrame::text(json)).await.is_err() {
                    debug!("websocket send failed, ending outbound pump");
                    return;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to serialize message");
                // Skip the message; don't kill the connection for it
            }
        }
    }

    debug!("mailbox closed, terminating transport");
    let _ = ws_tx.send(WsFrame::Close(None)).await;
}
