#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

//! # Pair Signal Server
//!
//! An in-memory WebSocket server that pairs anonymous clients one-to-one,
//! relays their WebRTC signaling payloads and forwards text chat between
//! partners. All state lives in process memory.

/// Server configuration and environment variables
pub mod config;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// Matching engine: registry, waiting pool and pairing table
pub mod pairing;

/// WebSocket message protocol definitions
pub mod protocol;

/// Main server orchestration
pub mod server;

/// WebSocket connection handling and HTTP endpoints
pub mod websocket;
