use indexmap::IndexMap;
use std::time::{Duration, Instant};

use crate::protocol::ClientId;

/// FIFO of clients looking for a partner.
///
/// Backed by an `IndexMap` so membership checks are O(1) while iteration
/// follows insertion order. Each entry remembers when it was queued.
#[derive(Debug, Default)]
pub struct WaitingPool {
    entries: IndexMap<ClientId, Instant>,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `client_id` to the back of the queue. No-op if already queued.
    pub fn enqueue(&mut self, client_id: ClientId, now: Instant) -> bool {
        if self.entries.contains_key(&client_id) {
            return false;
        }
        self.entries.insert(client_id, now);
        true
    }

    /// Remove `client_id` while keeping the order of everyone behind it.
    pub fn remove(&mut self, client_id: &ClientId) -> bool {
        self.entries.shift_remove(client_id).is_some()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.entries.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ClientId> {
        self.entries.keys()
    }

    /// Take the oldest entry that is not `requester` and passes `is_live`.
    ///
    /// Entries ahead of the candidate that fail `is_live` are ghosts and get
    /// dropped; they are returned alongside the candidate so the caller can
    /// log them.
    pub fn take_candidate<F>(
        &mut self,
        requester: &ClientId,
        is_live: F,
    ) -> (Option<ClientId>, Vec<ClientId>)
    where
        F: Fn(&ClientId) -> bool,
    {
        let mut ghosts = Vec::new();
        let mut candidate = None;

        for id in self.entries.keys() {
            if id == requester {
                continue;
            }
            if is_live(id) {
                candidate = Some(*id);
                break;
            }
            ghosts.push(*id);
        }

        for ghost in &ghosts {
            self.entries.shift_remove(ghost);
        }
        if let Some(id) = candidate {
            self.entries.shift_remove(&id);
        }

        (candidate, ghosts)
    }

    /// Drop every entry rejected by `keep`, returning the evicted ids in
    /// queue order. `keep` receives how long the entry has been waiting.
    pub fn evict<F>(&mut self, now: Instant, mut keep: F) -> Vec<ClientId>
    where
        F: FnMut(&ClientId, Duration) -> bool,
    {
        let mut evicted = Vec::new();
        self.entries.retain(|id, queued_at| {
            let waited = now.saturating_duration_since(*queued_at);
            if keep(id, waited) {
                true
            } else {
                evicted.push(*id);
                false
            }
        });
        evicted
    }
}
