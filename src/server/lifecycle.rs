use crate::protocol::ClientId;

use super::PairingServer;

impl PairingServer {
    /// Unregister a client connection: drop it from the waiting pool and its
    /// session, tell the partner, and release the outbound channel.
    /// Calling this more than once for the same client has no further effect.
    pub fn unregister_client(&self, client_id: &ClientId) {
        let outcome = self.state.lock().disconnect(client_id);

        if let Some(partner) = outcome.former_partner {
            self.metrics.increment_partner_left_notices();
            tracing::info!(%client_id, %partner, "Notifying partner of disconnect");
        }
        self.dispatch(outcome.deliveries);

        if let Some(connection) = self.connection_manager.remove_client(client_id) {
            self.metrics.decrement_active_connections();
            tracing::debug!(
                %client_id,
                client_addr = %connection.client_addr,
                connected_for_ms = connection.connected_at.elapsed().as_millis() as u64,
                "Released client channel"
            );
        }

        if outcome.was_connected {
            tracing::info!(
                %client_id,
                was_waiting = outcome.was_waiting,
                instance_id = %self.instance_id,
                "Client disconnected"
            );
        }
    }

    /// Disconnect a client (alias for unregister_client for testing compatibility)
    pub fn disconnect_client(&self, client_id: &ClientId) {
        self.unregister_client(client_id);
    }
}
