use std::collections::HashSet;

use crate::protocol::ClientId;

/// Set of client ids whose connection has been accepted and whose disconnect
/// has not yet been processed.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connected: HashSet<ClientId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already registered.
    pub fn connect(&mut self, client_id: ClientId) -> bool {
        self.connected.insert(client_id)
    }

    /// Returns `false` if the id was not registered.
    pub fn disconnect(&mut self, client_id: &ClientId) -> bool {
        self.connected.remove(client_id)
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.connected.contains(client_id)
    }

    pub fn len(&self) -> usize {
        self.connected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connected.is_empty()
    }
}
