// Protocol module: wire messages, identifiers, and input normalization

pub mod error_codes;
pub mod messages;
pub mod types;
pub mod validation;

pub use error_codes::ErrorCode;

pub use types::{epoch_millis, ClientId, DEFAULT_MAX_CHAT_MESSAGE_LENGTH};

pub use messages::{ClientMessage, ServerMessage};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_client_message_parsing() {
        let ready: ClientMessage = serde_json::from_str(r#"{"type":"ready"}"#).unwrap();
        assert!(matches!(ready, ClientMessage::Ready));

        let peer = Uuid::new_v4();
        let raw = json!({"type": "signal", "data": {"to": peer, "data": {"sdp": "offer"}}});
        match serde_json::from_value::<ClientMessage>(raw).unwrap() {
            ClientMessage::Signal { to, data } => {
                assert_eq!(to, Some(peer));
                assert_eq!(data, Some(json!({"sdp": "offer"})));
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let raw = json!({"type": "chatMessage", "data": {"message": "hi"}});
        match serde_json::from_value::<ClientMessage>(raw).unwrap() {
            ClientMessage::ChatMessage { message } => assert_eq!(message, Some(json!("hi"))),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_loose_relay_fields_still_parse() {
        let raw = json!({"type": "signal", "data": {"data": {"candidate": "c"}}});
        match serde_json::from_value::<ClientMessage>(raw).unwrap() {
            ClientMessage::Signal { to, .. } => assert!(to.is_none()),
            other => panic!("unexpected message: {other:?}"),
        }

        let raw = json!({"type": "chatMessage", "data": {"message": 7}});
        match serde_json::from_value::<ClientMessage>(raw).unwrap() {
            ClientMessage::ChatMessage { message } => assert_eq!(message, Some(json!(7))),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_server_message_wire_shape() {
        let peer = Uuid::new_v4();
        let matched = serde_json::to_value(ServerMessage::Matched { peer_id: peer }).unwrap();
        assert_eq!(matched, json!({"type": "matched", "data": {"peerId": peer}}));

        let left = serde_json::to_value(ServerMessage::PartnerLeft).unwrap();
        assert_eq!(left, json!({"type": "partnerLeft"}));

        let chat = serde_json::to_value(ServerMessage::ChatMessage {
            from: peer,
            message: "hello".to_string(),
            timestamp: 1_700_000_000_000,
        })
        .unwrap();
        assert_eq!(chat["type"], "chatMessage");
        assert_eq!(chat["data"]["from"], json!(peer));
        assert_eq!(chat["data"]["timestamp"], 1_700_000_000_000_i64);

        let error = serde_json::to_value(ServerMessage::Error {
            message: "too big".to_string(),
            error_code: Some(ErrorCode::MessageTooLarge),
        })
        .unwrap();
        assert_eq!(error["data"]["errorCode"], "MESSAGE_TOO_LARGE");
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"joinRoom"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }
}
