use crate::config::Config;
use crate::metrics::ServerMetrics;
use crate::pairing::{Outbound, PairingPolicy, PairingState, PairingStats};
use crate::protocol::{ClientId, ServerMessage};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Duration;
use uuid::Uuid;

mod connection_manager;
mod heartbeat;
mod lifecycle;
mod maintenance;
mod matching;
mod message_router;
mod messaging;
mod relay;

use connection_manager::ConnectionManager;

/// Pairing server: the matching and relay engine plus the per-client
/// outbound channels it delivers through.
pub struct PairingServer {
    /// Registry, waiting pool and pairing table behind one lock.
    /// Never held across an `.await` or a channel send.
    state: Mutex<PairingState>,
    /// Outbound channels and per-IP accounting
    connection_manager: ConnectionManager,
    /// Server configuration
    config: ServerConfig,
    /// Server metrics
    pub(crate) metrics: Arc<ServerMetrics>,
    /// Instance identifier
    instance_id: Uuid,
}

#[derive(Debug, Error)]
pub enum RegisterClientError {
    #[error("Too many connections from your IP ({current}/{limit})")]
    IpLimitExceeded { current: usize, limit: usize },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name reported by the info endpoint.
    pub server_name: String,
    /// Shared system message sent to both sides of a new match.
    pub match_greeting: Option<String>,
    /// Forward `signal` only between partners.
    pub strict_signal_routing: bool,
    /// Chat text is cut to this many characters.
    pub max_chat_message_length: usize,
    /// How often the reaper sweeps the waiting pool.
    pub reaper_interval: Duration,
    /// Evict clients that have waited longer than this. `None` keeps them forever.
    pub waiting_timeout: Option<Duration>,
    pub max_message_size: usize,
    pub max_connections_per_ip: usize,
    /// Capacity of each client's outbound channel.
    pub send_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: crate::config::defaults::default_server_name(),
            match_greeting: crate::config::defaults::default_match_greeting(),
            strict_signal_routing: false,
            max_chat_message_length: crate::protocol::DEFAULT_MAX_CHAT_MESSAGE_LENGTH,
            reaper_interval: Duration::from_secs(10),
            waiting_timeout: Some(Duration::from_secs(30)),
            max_message_size: 65536, // 64KB
            max_connections_per_ip: 10,
            send_queue_capacity: 64,
        }
    }
}

impl From<&Config> for ServerConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            server_name: cfg.server.server_name.clone(),
            match_greeting: cfg
                .server
                .match_greeting
                .clone()
                .filter(|greeting| !greeting.trim().is_empty()),
            strict_signal_routing: cfg.server.strict_signal_routing,
            max_chat_message_length: cfg.server.max_chat_message_length,
            reaper_interval: Duration::from_secs(cfg.server.reaper_interval_secs.max(1)),
            waiting_timeout: match cfg.server.waiting_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            max_message_size: cfg.security.max_message_size,
            max_connections_per_ip: cfg.security.max_connections_per_ip,
            send_queue_capacity: cfg.websocket.send_queue_capacity.max(1),
        }
    }
}

impl ServerConfig {
    fn pairing_policy(&self) -> PairingPolicy {
        PairingPolicy {
            match_greeting: self.match_greeting.clone(),
            strict_signal_routing: self.strict_signal_routing,
            max_chat_message_length: self.max_chat_message_length,
        }
    }
}

impl PairingServer {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let metrics = Arc::new(ServerMetrics::new());
        let instance_id = Uuid::new_v4();

        let server = Arc::new(Self {
            state: Mutex::new(PairingState::new(config.pairing_policy())),
            connection_manager: ConnectionManager::new(
                config.max_connections_per_ip,
                metrics.clone(),
            ),
            config,
            metrics,
            instance_id,
        });

        tracing::debug!(instance_id = %server.instance_id, "Pairing server initialized");
        server
    }

    /// Register a new client connection and greet it with its id.
    pub fn register_client(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) -> Result<ClientId, RegisterClientError> {
        let client_id = self
            .connection_manager
            .register_client(sender, client_addr)?;
        self.state.lock().connect(client_id);
        self.send_to_client(&client_id, ServerMessage::Connected { client_id });
        tracing::info!(%client_id, client_addr = %client_addr, instance_id = %self.instance_id, "Client connected");
        Ok(client_id)
    }

    /// Connect a client with a specific id, bypassing IP limits (used for testing)
    pub fn connect_client(&self, client_id: ClientId, sender: mpsc::Sender<Arc<ServerMessage>>) {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        self.connection_manager
            .connect_test_client(client_id, sender, addr);
        self.state.lock().connect(client_id);
        tracing::info!(%client_id, instance_id = %self.instance_id, "Client connected");
    }

    /// Deliver transition output. Must be called after the state lock is released.
    pub(crate) fn dispatch(&self, deliveries: Vec<Outbound>) {
        for Outbound { to, message } in deliveries {
            self.send_to_client(&to, message);
        }
    }

    pub(crate) fn send_to_client(&self, client_id: &ClientId, message: ServerMessage) {
        self.connection_manager
            .send_to_client(client_id, Arc::new(message));
    }

    /// Current connected, waiting and session counts.
    pub fn stats(&self) -> PairingStats {
        self.state.lock().stats()
    }

    pub fn is_waiting(&self, client_id: &ClientId) -> bool {
        self.state.lock().is_waiting(client_id)
    }

    pub fn partner_of(&self, client_id: &ClientId) -> Option<ClientId> {
        self.state.lock().partner_of(client_id)
    }

    pub fn is_connected(&self, client_id: &ClientId) -> bool {
        self.state.lock().is_connected(client_id)
    }

    /// Verify the pairing invariants against the live state.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.state.lock().check_invariants()
    }

    /// Readiness probe for the health endpoint. The state lock is never held
    /// across awaits, so acquiring it promptly means the engine is responsive.
    pub fn health_check(&self) -> bool {
        self.state
            .try_lock_for(std::time::Duration::from_secs(1))
            .is_some()
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get server metrics
    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }
}
