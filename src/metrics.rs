use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the pairing server, updated lock-free from every connection task.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Connection metrics
    pub total_connections: AtomicU64,
    pub active_connections: AtomicU64,
    pub disconnections: AtomicU64,
    pub connection_rejections: AtomicU64,
    pub websocket_messages_dropped: AtomicU64,
    pub oversized_frames: AtomicU64,
    pub unparseable_frames: AtomicU64,

    // Matching metrics
    pub ready_requests: AtomicU64,
    pub matches_made: AtomicU64,
    pub partner_left_notices: AtomicU64,

    // Relay metrics
    pub signals_relayed: AtomicU64,
    pub signals_dropped: AtomicU64,
    pub chat_messages_relayed: AtomicU64,
    pub chat_messages_dropped: AtomicU64,
    pub chat_advisories: AtomicU64,

    // Reaper metrics
    pub reaper_runs: AtomicU64,
    pub waiting_ghosts_removed: AtomicU64,
    pub waiting_entries_expired: AtomicU64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub connections: ConnectionMetrics,
    pub matching: MatchingMetrics,
    pub relay: RelayMetrics,
    pub reaper: ReaperMetrics,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectionMetrics {
    pub total_connections: u64,
    pub active_connections: u64,
    pub disconnections: u64,
    pub connection_rejections: u64,
    pub websocket_messages_dropped: u64,
    pub oversized_frames: u64,
    pub unparseable_frames: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchingMetrics {
    pub ready_requests: u64,
    pub matches_made: u64,
    pub partner_left_notices: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RelayMetrics {
    pub signals_relayed: u64,
    pub signals_dropped: u64,
    pub chat_messages_relayed: u64,
    pub chat_messages_dropped: u64,
    pub chat_advisories: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReaperMetrics {
    pub runs: u64,
    pub ghosts_removed: u64,
    pub entries_expired: u64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_connections(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_active_connections(&self) {
        // fetch_update so a stray double-decrement can never wrap around
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_sub(1)
            });
        self.disconnections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_connection_rejections(&self) {
        self.connection_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_websocket_messages_dropped(&self) {
        self.websocket_messages_dropped
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_oversized_frames(&self) {
        self.oversized_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unparseable_frames(&self) {
        self.unparseable_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ready_requests(&self) {
        self.ready_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_matches_made(&self) {
        self.matches_made.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_partner_left_notices(&self) {
        self.partner_left_notices.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_signals_relayed(&self) {
        self.signals_relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_signals_dropped(&self) {
        self.signals_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chat_messages_relayed(&self) {
        self.chat_messages_relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chat_messages_dropped(&self) {
        self.chat_messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chat_advisories(&self) {
        self.chat_advisories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reaper_run(&self, ghosts: u64, expired: u64) {
        self.reaper_runs.fetch_add(1, Ordering::Relaxed);
        self.waiting_ghosts_removed
            .fetch_add(ghosts, Ordering::Relaxed);
        self.waiting_entries_expired
            .fetch_add(expired, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: chrono::Utc::now(),
            connections: ConnectionMetrics {
                total_connections: self.total_connections.load(Ordering::Relaxed),
                active_connections: self.active_connections.load(Ordering::Relaxed),
                disconnections: self.disconnections.load(Ordering::Relaxed),
                connection_rejections: self.connection_rejections.load(Ordering::Relaxed),
                websocket_messages_dropped: self
                    .websocket_messages_dropped
                    .load(Ordering::Relaxed),
                oversized_frames: self.oversized_frames.load(Ordering::Relaxed),
                unparseable_frames: self.unparseable_frames.load(Ordering::Relaxed),
            },
            matching: MatchingMetrics {
                ready_requests: self.ready_requests.load(Ordering::Relaxed),
                matches_made: self.matches_made.load(Ordering::Relaxed),
                partner_left_notices: self.partner_left_notices.load(Ordering::Relaxed),
            },
            relay: RelayMetrics {
                signals_relayed: self.signals_relayed.load(Ordering::Relaxed),
                signals_dropped: self.signals_dropped.load(Ordering::Relaxed),
                chat_messages_relayed: self.chat_messages_relayed.load(Ordering::Relaxed),
                chat_messages_dropped: self.chat_messages_dropped.load(Ordering::Relaxed),
                chat_advisories: self.chat_advisories.load(Ordering::Relaxed),
            },
            reaper: ReaperMetrics {
                runs: self.reaper_runs.load(Ordering::Relaxed),
                ghosts_removed: self.waiting_ghosts_removed.load(Ordering::Relaxed),
                entries_expired: self.waiting_entries_expired.load(Ordering::Relaxed),
            },
        }
    }
}
