use std::collections::HashMap;

use crate::protocol::ClientId;

/// Symmetric partner map for active sessions.
///
/// Edges are only ever written and removed in both directions at once, so
/// `partner_of(a) == Some(b)` implies `partner_of(b) == Some(a)`.
#[derive(Debug, Default)]
pub struct PairingTable {
    partners: HashMap<ClientId, ClientId>,
}

impl PairingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session between `a` and `b`.
    ///
    /// Any session either side was already part of is torn down first and the
    /// orphaned former partners are returned.
    pub fn pair(&mut self, a: ClientId, b: ClientId) -> Vec<ClientId> {
        debug_assert_ne!(a, b, "a client cannot be paired with itself");
        let mut orphaned = Vec::new();
        orphaned.extend(self.unpair(&a));
        orphaned.extend(self.unpair(&b));
        self.partners.insert(a, b);
        self.partners.insert(b, a);
        orphaned
    }

    /// Remove the session `client_id` belongs to, returning the former partner.
    pub fn unpair(&mut self, client_id: &ClientId) -> Option<ClientId> {
        let partner = self.partners.remove(client_id)?;
        if self.partners.get(&partner) == Some(client_id) {
            self.partners.remove(&partner);
        }
        Some(partner)
    }

    pub fn partner_of(&self, client_id: &ClientId) -> Option<ClientId> {
        self.partners.get(client_id).copied()
    }

    pub fn is_paired(&self, client_id: &ClientId) -> bool {
        self.partners.contains_key(client_id)
    }

    /// Number of directed entries (twice the session count).
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    pub fn session_count(&self) -> usize {
        self.partners.len() / 2
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClientId, &ClientId)> {
        self.partners.iter()
    }
}
