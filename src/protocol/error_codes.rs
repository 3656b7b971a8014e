use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes carried by transport-level `error` frames.
///
/// Core events (ready, signal, chat) never produce these: malformed input is
/// dropped rather than answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The inbound frame exceeded `security.max_message_size`.
    MessageTooLarge,
    /// The remote address already holds `security.max_connections_per_ip` sockets.
    TooManyConnections,
}

impl ErrorCode {
    pub fn description(&self) -> &'static str {
        match self {
            Self::MessageTooLarge => "Message exceeds the maximum allowed size",
            Self::TooManyConnections => "Too many connections from this address",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::MessageTooLarge => "MESSAGE_TOO_LARGE",
            Self::TooManyConnections => "TOO_MANY_CONNECTIONS",
        };
        f.write_str(code)
    }
}
