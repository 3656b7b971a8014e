use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::metrics::ServerMetrics;
use crate::protocol::{ClientId, ServerMessage};

use super::RegisterClientError;

#[derive(Debug, Clone)]
pub(crate) struct ClientConnection {
    pub sender: mpsc::Sender<Arc<ServerMessage>>,
    pub client_addr: SocketAddr,
    pub connected_at: Instant,
}

/// Outbound channels for every live socket plus per-IP connection counts.
pub(crate) struct ConnectionManager {
    clients: DashMap<ClientId, ClientConnection>,
    connections_per_ip: DashMap<IpAddr, usize>,
    metrics: Arc<ServerMetrics>,
    max_connections_per_ip: usize,
}

impl ConnectionManager {
    pub fn new(max_connections_per_ip: usize, metrics: Arc<ServerMetrics>) -> Self {
        Self {
            clients: DashMap::new(),
            connections_per_ip: DashMap::new(),
            metrics,
            max_connections_per_ip,
        }
    }

    pub fn register_client(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) -> Result<ClientId, RegisterClientError> {
        let ip = client_addr.ip();
        if let Err(current) = self.try_reserve_ip_slot(ip) {
            warn!(
                %ip,
                current,
                max = self.max_connections_per_ip,
                "IP connection limit exceeded"
            );
            self.metrics.increment_connection_rejections();
            return Err(RegisterClientError::IpLimitExceeded {
                current,
                limit: self.max_connections_per_ip,
            });
        }

        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientConnection {
                sender,
                client_addr,
                connected_at: Instant::now(),
            },
        );
        self.metrics.increment_connections();
        Ok(client_id)
    }

    pub fn connect_test_client(
        &self,
        client_id: ClientId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) {
        self.increment_ip_slot_unbounded(client_addr.ip());
        self.clients.insert(
            client_id,
            ClientConnection {
                sender,
                client_addr,
                connected_at: Instant::now(),
            },
        );
        self.metrics.increment_connections();
    }

    /// Queue a message on the client's outbound channel without waiting.
    /// Returns false when the client is gone or its queue is full.
    pub fn send_to_client(&self, client_id: &ClientId, message: Arc<ServerMessage>) -> bool {
        let Some(sender) = self.clients.get(client_id).map(|conn| conn.sender.clone()) else {
            debug!(%client_id, "Client not connected, message not sent");
            return false;
        };

        match sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.metrics.increment_websocket_messages_dropped();
                warn!(%client_id, "Outbound queue full, message dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics.increment_websocket_messages_dropped();
                debug!(%client_id, "Outbound channel closed, message dropped");
                false
            }
        }
    }

    #[cfg(test)]
    pub fn has_client(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    #[cfg(test)]
    pub fn connections_from(&self, ip: &IpAddr) -> usize {
        self.connections_per_ip
            .get(ip)
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn remove_client(&self, client_id: &ClientId) -> Option<ClientConnection> {
        self.clients.remove(client_id).map(|(_, connection)| {
            self.release_ip_slot(connection.client_addr.ip());
            connection
        })
    }

    fn try_reserve_ip_slot(&self, ip: IpAddr) -> Result<usize, usize> {
        match self.connections_per_ip.entry(ip) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if current >= self.max_connections_per_ip {
                    Err(current)
                } else {
                    let count = entry.get_mut();
                    *count += 1;
                    Ok(*count)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                if self.max_connections_per_ip == 0 {
                    Err(0)
                } else {
                    entry.insert(1);
                    Ok(1)
                }
            }
        }
    }

    fn increment_ip_slot_unbounded(&self, ip: IpAddr) {
        *self.connections_per_ip.entry(ip).or_insert(0) += 1;
    }

    fn release_ip_slot(&self, ip: IpAddr) {
        if let Some(mut entry) = self.connections_per_ip.get_mut(&ip) {
            if *entry > 1 {
                *entry -= 1;
                return;
            }
        }
        self.connections_per_ip.remove(&ip);
    }
}
