use crate::server::PairingServer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handler::websocket_handler;
use super::metrics::metrics_handler;

/// Create the Axum router with WebSocket support
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<PairingServer>> {
    use tower_http::trace::TraceLayer;

    axum::Router::new()
        .route("/", get(info))
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(cors_origins: &str) -> CorsLayer {
    if cors_origins.trim() == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = cors_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured, using permissive CORS");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Health check endpoint
async fn health_check(State(server): State<Arc<PairingServer>>) -> Response {
    if !server.health_check() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let stats = server.stats();
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "connections": stats.connections,
        "waiting": stats.waiting,
        "sessions": stats.sessions,
    }))
    .into_response()
}

/// Service banner with live counts
async fn info(State(server): State<Arc<PairingServer>>) -> Json<serde_json::Value> {
    let stats = server.stats();
    Json(serde_json::json!({
        "name": server.config().server_name,
        "status": "running",
        "connections": stats.connections,
        "waiting": stats.waiting,
        "sessions": stats.sessions,
    }))
}

/// Serve the router on an already-bound listener until the process stops.
pub async fn run_server(
    listener: tokio::net::TcpListener,
    server: Arc<PairingServer>,
    cors_origins: &str,
) -> anyhow::Result<()> {
    let app = create_router(cors_origins).with_state(server);

    tracing::info!(addr = %listener.local_addr()?, "Starting pair signal server");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
