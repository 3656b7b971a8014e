//! Matching and relay engine.
//!
//! - [`registry`]: connected client ids
//! - [`waiting_pool`]: FIFO of clients looking for a partner
//! - [`pairing_table`]: symmetric partner map
//! - [`engine`]: [`PairingState`], which owns all three and turns client
//!   events into state transitions plus outbound messages

pub mod engine;
pub mod pairing_table;
pub mod registry;
pub mod waiting_pool;

pub use engine::{
    ChatDelivery, DisconnectOutcome, MatchResult, Outbound, PairingPolicy, PairingState,
    PairingStats, ReadyOutcome, RelayDrop, SweepOutcome, NO_PARTNER_MESSAGE,
    WAITING_EXPIRED_MESSAGE,
};
pub use pairing_table::PairingTable;
pub use registry::ConnectionRegistry;
pub use waiting_pool::WaitingPool;
