use serde_json::Value;

use crate::pairing::{ChatDelivery, RelayDrop};
use crate::protocol::ClientId;

use super::PairingServer;

impl PairingServer {
    /// Forward an opaque signaling payload to the named client.
    pub fn handle_signal(
        &self,
        from: &ClientId,
        to: Option<ClientId>,
        data: Option<Value>,
    ) -> Result<(), RelayDrop> {
        let routed = self.state.lock().signal(*from, to, data);

        match routed {
            Ok(outbound) => {
                self.metrics.increment_signals_relayed();
                tracing::trace!(%from, to = %outbound.to, "Relaying signal");
                self.dispatch(vec![outbound]);
                Ok(())
            }
            Err(reason) => {
                self.metrics.increment_signals_dropped();
                tracing::debug!(%from, ?to, %reason, "Dropping signal");
                Err(reason)
            }
        }
    }

    /// Relay chat text to the sender's partner, or tell an unpaired sender
    /// that nobody is listening.
    pub fn handle_chat_message(
        &self,
        from: &ClientId,
        message: Option<&Value>,
    ) -> Result<(), RelayDrop> {
        let delivery = self.state.lock().chat(*from, message);

        match delivery {
            Ok(delivery) => {
                match &delivery {
                    ChatDelivery::Relayed(outbound) => {
                        self.metrics.increment_chat_messages_relayed();
                        tracing::trace!(%from, to = %outbound.to, "Relaying chat message");
                    }
                    ChatDelivery::Advisory(_) => {
                        self.metrics.increment_chat_advisories();
                        tracing::debug!(%from, "Chat from unpaired client");
                    }
                }
                self.dispatch(vec![delivery.into_outbound()]);
                Ok(())
            }
            Err(reason) => {
                self.metrics.increment_chat_messages_dropped();
                tracing::debug!(%from, %reason, "Dropping chat message");
                Err(reason)
            }
        }
    }
}
