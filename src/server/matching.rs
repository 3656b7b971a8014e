use std::time::Instant;

use crate::pairing::MatchResult;
use crate::protocol::ClientId;

use super::PairingServer;

impl PairingServer {
    /// Handle a `ready` request: leave any current session, then match with
    /// the oldest live waiting client or join the waiting pool.
    pub fn handle_ready(&self, client_id: &ClientId) -> MatchResult {
        self.metrics.increment_ready_requests();

        let outcome = self.state.lock().ready(*client_id, Instant::now());

        if let Some(former) = outcome.detached {
            self.metrics.increment_partner_left_notices();
            tracing::info!(%client_id, partner = %former, "Client left session to search again");
        }
        if !outcome.purged.is_empty() {
            tracing::debug!(
                %client_id,
                purged = outcome.purged.len(),
                "Dropped stale waiting entries while matching"
            );
        }

        match outcome.result {
            MatchResult::Matched(peer_id) => {
                self.metrics.increment_matches_made();
                tracing::info!(%client_id, %peer_id, "Clients matched");
            }
            MatchResult::Queued => {
                tracing::debug!(%client_id, "Client queued for matching");
            }
            MatchResult::Ignored => {
                tracing::debug!(%client_id, "Ignoring ready from unknown client");
            }
        }

        self.dispatch(outcome.deliveries);
        outcome.result
    }
}
