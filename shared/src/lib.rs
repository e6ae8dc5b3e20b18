//! # Stockpile Shared
//! Aggregates item counts and removals across nearby storage backends into
//! one virtual inventory, gated by a peer trust handshake in multiplayer.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod backend;
mod backends;
mod broadcast;
mod cache;
mod clock;
mod config;
mod diagnostics;
mod handshake;
mod inventory;
mod operations;
mod priority;
mod types;

pub use backend::{
    backend::Backend,
    backend_access::{
        available, credit_slot, debit_slot, eligible_stacks, read_slots, SlotWrite,
    },
    backend_ref::BackendRef,
    category::{BackendCategory, BackendScope},
    error::BackendError,
    item_stack::{ItemStack, Slots},
    scan_provider::{ScanProvider, ScanRadius},
};
pub use backends::SystemClock;
pub use broadcast::{
    broadcast_config::BroadcastConfig,
    error::TransportError,
    lock_broadcaster::{BroadcastStats, LockBroadcaster},
    lock_transport::{LockTransport, NoopTransport},
};
pub use cache::{
    aggregation_cache::AggregationCache,
    cache_config::CacheConfig,
    cache_stats::CacheReport,
    invalidation::{CacheEvent, SubscriptionId},
    snapshot::{AggregationScope, AggregationSnapshot, BackendContribution},
};
pub use clock::{Clock, ManualClock};
pub use config::StockpileConfig;
pub use diagnostics::Diagnostics;
pub use handshake::{
    error::HandshakeError,
    gate::{FixedGate, GateSource, GateState, GateTransition},
    handshake_config::{HandshakeConfig, PROTOCOL_VERSION},
    lock_report::LockReport,
    peer_trust_record::{PeerTrustRecord, TrustState},
    trust_handshake::TrustHandshake,
};
pub use inventory::VirtualInventory;
pub use operations::{
    debit_receipt::{BackendTake, DebitReceipt, RemovedStack},
    error::OperationError,
    item_operations::ItemOperations,
    item_request::ItemRequest,
};
pub use priority::{
    category_match::{match_category, CategoryMatch},
    priority_orderer::{compute_order, OrderDiagnostic, OrderOutcome, PriorityOrder, PriorityOrderer},
    sort_key::{compare_sort_keys, SortKey},
};
pub use types::{BackendId, Cycle, ItemType, PeerId, Position};
