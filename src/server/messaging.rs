use super::PairingServer;
use crate::protocol::{ClientId, ErrorCode, ServerMessage};

impl PairingServer {
    /// Send a transport-level error frame to a specific client.
    pub fn send_error_to_client(&self, client_id: &ClientId, error_code: ErrorCode) {
        self.send_to_client(
            client_id,
            ServerMessage::Error {
                message: error_code.description().to_string(),
                error_code: Some(error_code),
            },
        );
    }
}
