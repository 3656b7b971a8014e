//! Matching and relay behavior configuration.

use super::defaults::{
    default_match_greeting, default_max_chat_message_length, default_reaper_interval_secs,
    default_server_name, default_waiting_timeout_secs,
};
use serde::{Deserialize, Serialize};

/// Server configuration for matching, relay and the waiting-pool reaper.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Chat text is truncated to this many characters
    #[serde(default = "default_max_chat_message_length")]
    pub max_chat_message_length: usize,
    /// System message sent to both clients when they are matched.
    /// `null` or an empty string disables it.
    #[serde(default = "default_match_greeting")]
    pub match_greeting: Option<String>,
    /// Only forward `signal` events between current partners
    #[serde(default)]
    pub strict_signal_routing: bool,
    /// Interval for the waiting-pool reaper (seconds)
    #[serde(default = "default_reaper_interval_secs")]
    pub reaper_interval_secs: u64,
    /// Maximum time a client may sit in the waiting pool (seconds, 0 = unlimited)
    #[serde(default = "default_waiting_timeout_secs")]
    pub waiting_timeout_secs: u64,
    /// Name reported by the info endpoint
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_chat_message_length: default_max_chat_message_length(),
            match_greeting: default_match_greeting(),
            strict_signal_routing: false,
            reaper_interval_secs: default_reaper_interval_secs(),
            waiting_timeout_secs: default_waiting_timeout_secs(),
            server_name: default_server_name(),
        }
    }
}
