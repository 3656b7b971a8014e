//! Normalization of loosely typed relay input.
//!
//! Both helpers return `None` for input the relay should drop without reply.

use super::types::ClientId;

/// Coerce a raw chat body into relayable text.
///
/// Non-string values and strings that are blank after trimming are rejected.
/// Surviving text is trimmed and capped at `max_chars` Unicode scalar values.
pub fn normalize_chat_message(raw: Option<&serde_json::Value>, max_chars: usize) -> Option<String> {
    let text = raw?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Some(text[..cut].to_string()),
        None => Some(text.to_string()),
    }
}

/// Validate the target and payload of a `signal` event.
///
/// A missing target, a nil id, or a null payload makes the event unroutable.
pub fn signal_route(
    to: Option<ClientId>,
    data: Option<serde_json::Value>,
) -> Option<(ClientId, serde_json::Value)> {
    let to = to.filter(|id| !id.is_nil())?;
    let data = data.filter(|value| !value.is_null())?;
    Some((to, data))
}
