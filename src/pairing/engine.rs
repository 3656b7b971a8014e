use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::protocol::validation::{normalize_chat_message, signal_route};
use crate::protocol::{epoch_millis, ClientId, ServerMessage, DEFAULT_MAX_CHAT_MESSAGE_LENGTH};

use super::pairing_table::PairingTable;
use super::registry::ConnectionRegistry;
use super::waiting_pool::WaitingPool;

/// Advisory sent to a client that chats without a partner.
pub const NO_PARTNER_MESSAGE: &str =
    "You are not connected to anyone yet. Chat is available once you are matched with a partner.";

/// Advisory sent to a client evicted from the waiting pool by the reaper.
pub const WAITING_EXPIRED_MESSAGE: &str =
    "No partner was found in time. Send ready again to keep searching.";

/// One message addressed to one client, produced by a state transition and
/// delivered after the state lock is released.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ClientId,
    pub message: ServerMessage,
}

impl Outbound {
    fn new(to: ClientId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// Behavioral knobs for the matching and relay engine.
#[derive(Debug, Clone)]
pub struct PairingPolicy {
    /// Shared system message sent to both sides of a fresh match.
    pub match_greeting: Option<String>,
    /// Only forward `signal` events to the sender's current partner.
    pub strict_signal_routing: bool,
    /// Chat text is cut to this many Unicode scalar values.
    pub max_chat_message_length: usize,
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self {
            match_greeting: None,
            strict_signal_routing: false,
            max_chat_message_length: DEFAULT_MAX_CHAT_MESSAGE_LENGTH,
        }
    }
}

/// How a `ready` request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Paired with the given waiting client.
    Matched(ClientId),
    /// Nobody suitable was waiting; the client is now queued.
    Queued,
    /// The requester is not connected.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyOutcome {
    pub result: MatchResult,
    /// Partner the requester was detached from before matching.
    pub detached: Option<ClientId>,
    /// Ghost entries purged from the waiting pool during the scan.
    pub purged: Vec<ClientId>,
    pub deliveries: Vec<Outbound>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisconnectOutcome {
    pub was_connected: bool,
    pub was_waiting: bool,
    pub former_partner: Option<ClientId>,
    pub deliveries: Vec<Outbound>,
}

/// Result of a successfully handled chat event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatDelivery {
    /// Forwarded to the sender's partner.
    Relayed(Outbound),
    /// The sender has no partner and gets an advisory instead.
    Advisory(Outbound),
}

impl ChatDelivery {
    pub fn into_outbound(self) -> Outbound {
        match self {
            Self::Relayed(outbound) | Self::Advisory(outbound) => outbound,
        }
    }
}

/// Reasons a relay event was dropped without reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayDrop {
    #[error("event is missing a target or payload")]
    Malformed,
    #[error("sender is not connected")]
    UnknownSender,
    #[error("target is not connected")]
    TargetOffline,
    #[error("target is not the sender's partner")]
    NotPartner,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    /// Waiting entries whose client is no longer connected.
    pub ghosts: Vec<ClientId>,
    /// Live clients that waited longer than the configured limit.
    pub expired: Vec<ClientId>,
    pub deliveries: Vec<Outbound>,
}

impl SweepOutcome {
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty() && self.expired.is_empty()
    }
}

/// Point-in-time counts for health and info endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PairingStats {
    pub connections: usize,
    pub waiting: usize,
    pub sessions: usize,
}

/// The matching and relay engine.
///
/// Owns the connection registry, the waiting pool and the pairing table, and
/// exposes every client event as one synchronous transition. Callers are
/// expected to hold a single lock around each call and to deliver the
/// returned [`Outbound`] messages only after releasing it.
#[derive(Debug, Default)]
pub struct PairingState {
    registry: ConnectionRegistry,
    waiting: WaitingPool,
    pairs: PairingTable,
    policy: PairingPolicy,
}

impl PairingState {
    pub fn new(policy: PairingPolicy) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            waiting: WaitingPool::new(),
            pairs: PairingTable::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &PairingPolicy {
        &self.policy
    }

    /// Register a freshly accepted connection.
    pub fn connect(&mut self, client_id: ClientId) -> bool {
        self.registry.connect(client_id)
    }

    /// Handle a `ready` request: drop any current partner, then match with
    /// the oldest live waiting client or join the queue.
    pub fn ready(&mut self, client_id: ClientId, now: Instant) -> ReadyOutcome {
        let mut deliveries = Vec::new();

        if !self.registry.contains(&client_id) {
            return ReadyOutcome {
                result: MatchResult::Ignored,
                detached: None,
                purged: Vec::new(),
                deliveries,
            };
        }

        let detached = self.pairs.unpair(&client_id);
        if let Some(former) = detached {
            deliveries.push(Outbound::new(former, ServerMessage::PartnerLeft));
        }

        self.waiting.remove(&client_id);

        let registry = &self.registry;
        let pairs = &self.pairs;
        let (candidate, purged) = self.waiting.take_candidate(&client_id, |id| {
            registry.contains(id) && !pairs.is_paired(id)
        });

        let result = match candidate {
            Some(peer_id) => {
                self.pairs.pair(client_id, peer_id);
                deliveries.push(Outbound::new(
                    client_id,
                    ServerMessage::Matched { peer_id },
                ));
                deliveries.push(Outbound::new(
                    peer_id,
                    ServerMessage::Matched { peer_id: client_id },
                ));
                if let Some(greeting) = &self.policy.match_greeting {
                    let timestamp = epoch_millis();
                    for to in [client_id, peer_id] {
                        deliveries.push(Outbound::new(
                            to,
                            ServerMessage::SystemMessage {
                                message: greeting.clone(),
                                timestamp,
                            },
                        ));
                    }
                }
                MatchResult::Matched(peer_id)
            }
            None => {
                self.waiting.enqueue(client_id, now);
                MatchResult::Queued
            }
        };

        ReadyOutcome {
            result,
            detached,
            purged,
            deliveries,
        }
    }

    /// Forward an opaque signaling payload.
    ///
    /// Any connected client may be targeted unless strict routing is enabled,
    /// in which case the target must be the sender's partner.
    pub fn signal(
        &self,
        from: ClientId,
        to: Option<ClientId>,
        data: Option<serde_json::Value>,
    ) -> Result<Outbound, RelayDrop> {
        let (to, data) = signal_route(to, data).ok_or(RelayDrop::Malformed)?;
        if !self.registry.contains(&from) {
            return Err(RelayDrop::UnknownSender);
        }
        if !self.registry.contains(&to) {
            return Err(RelayDrop::TargetOffline);
        }
        if self.policy.strict_signal_routing && self.pairs.partner_of(&from) != Some(to) {
            return Err(RelayDrop::NotPartner);
        }
        Ok(Outbound::new(to, ServerMessage::Signal { from, data }))
    }

    /// Forward chat text to the sender's partner, or advise the sender that
    /// nobody is listening.
    pub fn chat(
        &self,
        from: ClientId,
        raw: Option<&serde_json::Value>,
    ) -> Result<ChatDelivery, RelayDrop> {
        let message = normalize_chat_message(raw, self.policy.max_chat_message_length)
            .ok_or(RelayDrop::Malformed)?;
        if !self.registry.contains(&from) {
            return Err(RelayDrop::UnknownSender);
        }

        let timestamp = epoch_millis();
        match self.pairs.partner_of(&from) {
            Some(partner) => Ok(ChatDelivery::Relayed(Outbound::new(
                partner,
                ServerMessage::ChatMessage {
                    from,
                    message,
                    timestamp,
                },
            ))),
            None => Ok(ChatDelivery::Advisory(Outbound::new(
                from,
                ServerMessage::SystemMessage {
                    message: NO_PARTNER_MESSAGE.to_string(),
                    timestamp,
                },
            ))),
        }
    }

    /// Remove a client from every structure and notify its partner.
    /// Safe to call any number of times.
    pub fn disconnect(&mut self, client_id: &ClientId) -> DisconnectOutcome {
        let was_connected = self.registry.disconnect(client_id);
        let was_waiting = self.waiting.remove(client_id);
        let former_partner = self.pairs.unpair(client_id);

        let deliveries = former_partner
            .map(|partner| vec![Outbound::new(partner, ServerMessage::PartnerLeft)])
            .unwrap_or_default();

        DisconnectOutcome {
            was_connected,
            was_waiting,
            former_partner,
            deliveries,
        }
    }

    /// Reaper pass over the waiting pool.
    ///
    /// Entries for disconnected or already-paired clients are always dropped.
    /// With `max_wait` set, live clients queued longer than it are dropped as
    /// well and told to send `ready` again.
    pub fn sweep_waiting(&mut self, now: Instant, max_wait: Option<Duration>) -> SweepOutcome {
        let registry = &self.registry;
        let pairs = &self.pairs;
        let mut ghosts = Vec::new();
        let mut expired = Vec::new();

        self.waiting.evict(now, |id, waited| {
            if !registry.contains(id) || pairs.is_paired(id) {
                ghosts.push(*id);
                return false;
            }
            if max_wait.is_some_and(|limit| waited > limit) {
                expired.push(*id);
                return false;
            }
            true
        });

        let timestamp = epoch_millis();
        let deliveries = expired
            .iter()
            .map(|id| {
                Outbound::new(
                    *id,
                    ServerMessage::SystemMessage {
                        message: WAITING_EXPIRED_MESSAGE.to_string(),
                        timestamp,
                    },
                )
            })
            .collect();

        SweepOutcome {
            ghosts,
            expired,
            deliveries,
        }
    }

    pub fn is_connected(&self, client_id: &ClientId) -> bool {
        self.registry.contains(client_id)
    }

    pub fn is_waiting(&self, client_id: &ClientId) -> bool {
        self.waiting.contains(client_id)
    }

    pub fn partner_of(&self, client_id: &ClientId) -> Option<ClientId> {
        self.pairs.partner_of(client_id)
    }

    /// Waiting clients, oldest first.
    pub fn waiting_clients(&self) -> Vec<ClientId> {
        self.waiting.iter().copied().collect()
    }

    pub fn stats(&self) -> PairingStats {
        PairingStats {
            connections: self.registry.len(),
            waiting: self.waiting.len(),
            sessions: self.pairs.session_count(),
        }
    }

    /// Verify the structural invariants: symmetric edges, at most one partner
    /// each, no self-pairing, paired and waiting clients connected, waiting
    /// pool disjoint from the pairing table.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (a, b) in self.pairs.iter() {
            if a == b {
                return Err(format!("{a} is paired with itself"));
            }
            if self.pairs.partner_of(b) != Some(*a) {
                return Err(format!("edge {a} -> {b} has no reverse edge"));
            }
            if !self.registry.contains(a) {
                return Err(format!("{a} is paired but not connected"));
            }
            if self.waiting.contains(a) {
                return Err(format!("{a} is both paired and waiting"));
            }
        }
        for id in self.waiting.iter() {
            if !self.registry.contains(id) {
                return Err(format!("{id} is waiting but not connected"));
            }
        }
        if self.pairs.len() % 2 != 0 {
            return Err(format!("odd number of pairing entries: {}", self.pairs.len()));
        }
        Ok(())
    }
}
