//! Default value functions for configuration fields.
//!
//! Used by serde's `#[serde(default = ...)]` attributes across the config
//! structs, grouped by section.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    4000
}

// =============================================================================
// Server Defaults
// =============================================================================

pub const fn default_max_chat_message_length() -> usize {
    crate::protocol::DEFAULT_MAX_CHAT_MESSAGE_LENGTH
}

pub fn default_match_greeting() -> Option<String> {
    Some("You are now connected with a stranger. Say hi!".to_string())
}

pub const fn default_reaper_interval_secs() -> u64 {
    10
}

pub const fn default_waiting_timeout_secs() -> u64 {
    30
}

pub fn default_server_name() -> String {
    "Pair Signal Server".to_string()
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub const fn default_max_message_size() -> usize {
    65536 // 64KB
}

pub const fn default_max_connections_per_ip() -> usize {
    10
}

// =============================================================================
// WebSocket Defaults
// =============================================================================

pub const fn default_send_queue_capacity() -> usize {
    64
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
