use crate::protocol::{ClientId, ClientMessage};

use super::PairingServer;

impl PairingServer {
    /// Dispatch one decoded client event. Events that cannot be honored are
    /// dropped silently; the client never gets an error reply for them.
    pub fn handle_client_message(&self, client_id: &ClientId, message: ClientMessage) {
        match message {
            ClientMessage::Ready => {
                self.handle_ready(client_id);
            }
            ClientMessage::Signal { to, data } => {
                let _ = self.handle_signal(client_id, to, data);
            }
            ClientMessage::ChatMessage { message } => {
                let _ = self.handle_chat_message(client_id, message.as_ref());
            }
            ClientMessage::Ping => {
                self.handle_ping(client_id);
            }
        }
    }
}
