use crate::server::PairingServer;
use axum::extract::State;
use axum::response::Json;
use std::sync::Arc;

/// JSON snapshot of the server counters plus the live pairing gauges.
pub async fn metrics_handler(State(server): State<Arc<PairingServer>>) -> Json<serde_json::Value> {
    let snapshot = server.metrics().snapshot();
    let stats = server.stats();

    Json(serde_json::json!({
        "timestamp": snapshot.timestamp.to_rfc3339(),
        "instanceId": server.instance_id(),
        "pairing": stats,
        "connections": snapshot.connections,
        "matching": snapshot.matching,
        "relay": snapshot.relay,
        "reaper": snapshot.reaper,
    }))
}
