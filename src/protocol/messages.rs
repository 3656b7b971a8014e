use serde::{Deserialize, Serialize};

use super::error_codes::ErrorCode;
use super::types::ClientId;

/// Message types sent from client to server.
///
/// Relay fields are deliberately loose (`Option`, raw JSON) so that a frame
/// with a missing target or a non-string chat body still parses and the relay
/// can drop it quietly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Looking for a (new) partner
    Ready,
    /// Opaque WebRTC signaling addressed to another client
    Signal {
        #[serde(default)]
        to: Option<ClientId>,
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    /// Text chat for the current partner
    ChatMessage {
        #[serde(default)]
        message: Option<serde_json::Value>,
    },
    /// Heartbeat to keep intermediaries from idling the socket out
    Ping,
}

/// Message types sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// First frame on every socket: the id other clients will know us by
    Connected { client_id: ClientId },
    /// Paired with another client
    Matched { peer_id: ClientId },
    /// The current partner disconnected or asked for someone new
    PartnerLeft,
    /// Signaling payload from another client, forwarded untouched
    Signal {
        from: ClientId,
        data: serde_json::Value,
    },
    /// Chat text from the current partner
    ChatMessage {
        from: ClientId,
        message: String,
        timestamp: i64,
    },
    /// Server-authored notice (greetings, advisories)
    SystemMessage { message: String, timestamp: i64 },
    /// Pong response to ping
    Pong,
    /// Transport-level failure (size or connection limits)
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
}
