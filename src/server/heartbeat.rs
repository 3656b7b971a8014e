use crate::protocol::{ClientId, ServerMessage};

use super::PairingServer;

impl PairingServer {
    /// Answer an application-level ping.
    pub fn handle_ping(&self, client_id: &ClientId) {
        self.send_to_client(client_id, ServerMessage::Pong);
    }
}
