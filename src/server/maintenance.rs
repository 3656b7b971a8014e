use std::time::Instant;

use crate::pairing::SweepOutcome;

use super::PairingServer;

impl PairingServer {
    /// Periodic reaper for the waiting pool.
    pub async fn reaper_task(&self) {
        let mut interval = tokio::time::interval(self.config.reaper_interval);

        loop {
            interval.tick().await;
            self.run_reaper_sweep();
        }
    }

    /// One reaper pass. Drops waiting entries for clients that disconnected or
    /// got paired, and expires clients that waited past the configured limit.
    pub fn run_reaper_sweep(&self) -> SweepOutcome {
        let mut outcome = self
            .state
            .lock()
            .sweep_waiting(Instant::now(), self.config.waiting_timeout);

        self.metrics
            .record_reaper_run(outcome.ghosts.len() as u64, outcome.expired.len() as u64);

        if !outcome.is_empty() {
            tracing::info!(
                ghosts = outcome.ghosts.len(),
                expired = outcome.expired.len(),
                instance_id = %self.instance_id,
                "Reaped waiting pool"
            );
        }

        self.dispatch(std::mem::take(&mut outcome.deliveries));
        outcome
    }
}
