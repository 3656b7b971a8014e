use crate::protocol::{ClientId, ClientMessage, ErrorCode, ServerMessage};
use crate::server::{PairingServer, RegisterClientError};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use super::sending::{send_immediate_server_message, send_text_message};

/// Why an inbound frame was not turned into a client event.
#[derive(Debug, Error)]
pub enum FrameRejection {
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },
    #[error("frame is not a recognized event: {0}")]
    Unparseable(#[from] serde_json::Error),
}

/// Enforce the size limit, then decode a text frame into a client event.
pub fn decode_frame(text: &str, max_size: usize) -> Result<ClientMessage, FrameRejection> {
    if text.len() > max_size {
        return Err(FrameRejection::TooLarge {
            size: text.len(),
            max: max_size,
        });
    }
    Ok(serde_json::from_str(text)?)
}

pub(super) async fn handle_socket(socket: WebSocket, server: Arc<PairingServer>, addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(server.config().send_queue_capacity);

    let client_id = match server.register_client(tx, addr) {
        Ok(client_id) => {
            tracing::info!(%client_id, client_addr = %addr, "WebSocket connection established");
            client_id
        }
        Err(err @ RegisterClientError::IpLimitExceeded { .. }) => {
            let error_message = ServerMessage::Error {
                message: err.to_string(),
                error_code: Some(ErrorCode::TooManyConnections),
            };
            if let Err(err) = send_immediate_server_message(&mut sender, &error_message).await {
                tracing::debug!(
                    client_addr = %addr,
                    error = %err,
                    "Failed to send IP limit error frame"
                );
            }
            let _ = sender.close().await;
            return;
        }
    };

    // Drains the outbound queue. The queue closes once the client is
    // unregistered, which flushes anything still pending and ends the task.
    let server_clone = server.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if send_text_message(&mut sender, &message, &client_id)
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sender.close().await;
        server_clone.unregister_client(&client_id);
    });

    let server_clone = server.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(%client_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_text_frame(&server_clone, &client_id, text.as_str()),
                Message::Binary(payload) => {
                    server_clone.metrics.increment_unparseable_frames();
                    tracing::debug!(%client_id, size = payload.len(), "Dropping binary frame");
                }
                Message::Close(_) => {
                    tracing::debug!(%client_id, "WebSocket close frame received");
                    break;
                }
                // Protocol-level ping/pong is answered by the transport.
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }

        server_clone.unregister_client(&client_id);
    });

    tokio::select! {
        _ = &mut send_task => {
            tracing::debug!(%client_id, "Send task completed");
            receive_task.abort();
        }
        _ = &mut receive_task => {
            tracing::debug!(%client_id, "Receive task completed");
        }
    }

    // Idempotent; covers an aborted receive task.
    server.unregister_client(&client_id);
}

fn handle_text_frame(server: &PairingServer, client_id: &ClientId, text: &str) {
    match decode_frame(text, server.config().max_message_size) {
        Ok(message) => server.handle_client_message(client_id, message),
        Err(FrameRejection::TooLarge { size, max }) => {
            server.metrics.increment_oversized_frames();
            tracing::warn!(%client_id, size, max, "Message exceeds size limit");
            server.send_error_to_client(client_id, ErrorCode::MessageTooLarge);
        }
        Err(FrameRejection::Unparseable(err)) => {
            server.metrics.increment_unparseable_frames();
            tracing::debug!(%client_id, error = %err, "Dropping unparseable frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn oversized_frames_are_rejected_before_parsing() {
        let frame = format!(r#"{{"type":"chatMessage","data":{{"message":"{}"}}}}"#, "x".repeat(64));
        match decode_frame(&frame, 32) {
            Err(FrameRejection::TooLarge { size, max }) => {
                assert_eq!(size, frame.len());
                assert_eq!(max, 32);
            }
            other => panic!("expected size rejection, got {other:?}"),
        }
    }

    #[test]
    fn garbage_and_unknown_events_are_unparseable() {
        assert!(matches!(
            decode_frame("not json", 1024),
            Err(FrameRejection::Unparseable(_))
        ));
        assert!(matches!(
            decode_frame(r#"{"type":"joinRoom"}"#, 1024),
            Err(FrameRejection::Unparseable(_))
        ));
    }

    #[test]
    fn well_formed_frames_decode() {
        let peer = Uuid::new_v4();
        let frame = format!(r#"{{"type":"signal","data":{{"to":"{peer}","data":{{"sdp":"v=0"}}}}}}"#);
        match decode_frame(&frame, 1024).expect("decodes") {
            ClientMessage::Signal { to, data } => {
                assert_eq!(to, Some(peer));
                assert!(data.is_some());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            decode_frame(r#"{"type":"ready"}"#, 1024),
            Ok(ClientMessage::Ready)
        ));
    }

    #[test]
    fn signal_without_target_still_decodes() {
        assert!(matches!(
            decode_frame(r#"{"type":"signal","data":{"data":{"sdp":"v=0"}}}"#, 1024),
            Ok(ClientMessage::Signal { to: None, .. })
        ));
    }
}
