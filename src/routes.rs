//! HTTP side-channel: health check, stats, landing page, stylesheet.
//!
//! These endpoints are plain request/response glue around the hub; the
//! stats endpoint consumes only `connection_count()`.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handler::ws_handler;

/// Embedded stylesheet served at `/static/styles.css`
const STYLESHEET: &str = include_str!("../static/styles.css");

/// Fixed landing page served at `/`
const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Chat Relay</title>
    <link rel="stylesheet" href="/static/styles.css">
</head>
<body>
    <h1>Chat Relay WebSocket Server</h1>
    <p>WebSocket endpoint: <code>/ws</code></p>
    <p>Health check: <a href="/health">/health</a></p>
    <p>Stats: <a href="/stats">/stats</a></p>
    <h2>Usage:</h2>
    <p>Connect to the WebSocket endpoint with query parameters:</p>
    <ul>
        <li><code>username</code> - Your display name (default: "Anonymous")</li>
        <li><code>channel</code> - Channel name (default: "general")</li>
    </ul>
    <p>Example: <code>ws://localhost:8080/ws?username=John&amp;channel=general</code></p>
</body>
</html>
"#;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// Stats response
#[derive(Debug, Serialize)]
struct StatsResponse {
    connected_clients: usize,
}

/// `GET /health` — fixed liveness payload
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
    })
}

/// `GET /stats` — live connection count from the hub roster
async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse {
        connected_clients: state.hub.connection_count().await,
    })
}

/// `GET /` — fixed HTML landing page
async fn landing_handler() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// `GET /static/styles.css` — embedded stylesheet
async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLESHEET)
}

/// Builds the complete router: WebSocket endpoint plus the HTTP surface.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/static/styles.css", get(stylesheet_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
