use uuid::Uuid;

/// Default upper bound on relayed chat text, in Unicode scalar values.
pub const DEFAULT_MAX_CHAT_MESSAGE_LENGTH: usize = 2000;

/// Server-issued identifier for one connected client.
///
/// Minted when the transport accepts a connection and valid until that
/// connection's disconnect has been processed.
pub type ClientId = Uuid;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
