// WebSocket module - organized into focused submodules
//
// - handler: WebSocket upgrade handler (entry point)
// - connection: per-socket send/receive tasks and frame decoding
// - sending: message serialization and sending functions
// - routes: HTTP route setup (websocket, health, info) and server startup
// - metrics: JSON metrics endpoint

mod connection;
mod handler;
mod metrics;
mod routes;
mod sending;

pub use connection::{decode_frame, FrameRejection};
pub use handler::websocket_handler;
pub use metrics::metrics_handler;
pub use routes::{create_router, run_server};
