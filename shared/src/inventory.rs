use std::sync::Arc;

use log::info;

use crate::{
    backend::scan_provider::ScanProvider,
    broadcast::{lock_broadcaster::LockBroadcaster, lock_transport::LockTransport},
    cache::{
        aggregation_cache::AggregationCache,
        invalidation::{CacheEvent, SubscriptionId},
        snapshot::AggregationScope,
    },
    clock::Clock,
    config::StockpileConfig,
    diagnostics::Diagnostics,
    handshake::{
        error::HandshakeError,
        gate::{GateState, GateTransition},
        lock_report::LockReport,
        trust_handshake::TrustHandshake,
    },
    operations::{
        debit_receipt::DebitReceipt, error::OperationError, item_operations::ItemOperations,
        item_request::ItemRequest,
    },
    priority::priority_orderer::{PriorityOrder, PriorityOrderer},
    types::{BackendId, ItemType, PeerId, Position},
};

/// One virtual inventory over every storage backend near the player.
///
/// Gameplay code sees only `count`, `has` and `debit`. Host networking code
/// feeds peer events in, host UI code feeds backend events in, and the
/// simulation loop calls [`VirtualInventory::update`] once per frame.
pub struct VirtualInventory {
    clock: Arc<dyn Clock>,
    orderer: PriorityOrderer,
    cache: Arc<AggregationCache>,
    handshake: Arc<TrustHandshake>,
    operations: ItemOperations,
    broadcaster: LockBroadcaster,
}

impl VirtualInventory {
    pub fn new(
        config: StockpileConfig,
        provider: Arc<dyn ScanProvider>,
        transport: Arc<dyn LockTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let StockpileConfig {
            priority,
            cache: cache_config,
            handshake: handshake_config,
            broadcast: broadcast_config,
        } = config;

        let orderer = PriorityOrderer::new(priority);
        let cache = Arc::new(AggregationCache::new(
            provider,
            clock.clone(),
            orderer.order(),
            cache_config,
        ));
        let handshake = Arc::new(TrustHandshake::new(clock.clone(), handshake_config));
        let operations = ItemOperations::new(cache.clone(), handshake.clone());
        let broadcaster = LockBroadcaster::new(transport, clock.clone(), broadcast_config);

        Self {
            clock,
            orderer,
            cache,
            handshake,
            operations,
            broadcaster,
        }
    }

    // Gameplay queries

    pub fn count(&self, item: &ItemType) -> u64 {
        self.operations.count(item)
    }

    pub fn has(&self, requests: &[ItemRequest], multiplier: i32) -> Result<bool, OperationError> {
        self.operations.has(requests, multiplier)
    }

    pub fn debit(
        &self,
        requests: &[ItemRequest],
        multiplier: i32,
    ) -> Result<DebitReceipt, OperationError> {
        self.operations.debit(requests, multiplier)
    }

    pub fn debit_with_order(
        &self,
        requests: &[ItemRequest],
        multiplier: i32,
        order: &PriorityOrder,
    ) -> Result<DebitReceipt, OperationError> {
        self.operations.debit_with_order(requests, multiplier, order)
    }

    pub fn set_reference_point(&self, position: Position) {
        self.operations.set_reference_point(position);
    }

    // Simulation

    /// Advances the update cycle, expires overdue handshakes and flushes any
    /// held gate notification
    pub fn update(&self) {
        self.clock.advance_cycle();
        self.handshake.update();
        self.broadcaster.update();
    }

    // Peer events

    pub fn peer_joined(&self, peer: PeerId) -> Result<(), HandshakeError> {
        let transition = self.handshake.peer_joined(peer)?;
        self.apply_transition(transition);
        Ok(())
    }

    pub fn peer_acknowledged(&self, peer: PeerId, version: &str) -> Result<(), HandshakeError> {
        let transition = self.handshake.acknowledge(peer, version)?;
        self.apply_transition(transition);
        Ok(())
    }

    pub fn peer_left(&self, peer: PeerId) -> Result<(), HandshakeError> {
        let transition = self.handshake.peer_left(peer)?;
        self.apply_transition(transition);
        Ok(())
    }

    // Backend events

    pub fn backend_opened(&self, backend: BackendId) {
        self.cache.invalidate_on(CacheEvent::BackendOpened(backend));
    }

    pub fn backend_closed(&self, backend: BackendId) {
        self.cache.invalidate_on(CacheEvent::BackendClosed(backend));
    }

    pub fn slot_changed(&self, backend: BackendId, slot: usize) {
        self.cache.invalidate_on(CacheEvent::SlotChanged { backend, slot });
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn on_invalidated(
        &self,
        callback: impl Fn(&CacheEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.cache.on_invalidated(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.cache.unsubscribe(id)
    }

    // Diagnostics

    pub fn gate(&self) -> GateState {
        self.handshake.gate()
    }

    pub fn lock_report(&self) -> LockReport {
        self.handshake.lock_report()
    }

    pub fn priority_order(&self) -> PriorityOrder {
        self.orderer.order()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let report = self.handshake.lock_report();
        Diagnostics {
            gate: report.gate,
            unverified: report.unverified,
            order: self.orderer.order(),
            order_notes: self.orderer.diagnostics().to_vec(),
            cache: self.cache.stats(),
            broadcast: self.broadcaster.stats(),
        }
    }

    // called with no handshake lock held; the broadcaster drops stale epochs
    fn apply_transition(&self, transition: Option<GateTransition>) {
        let Some(transition) = transition else {
            return;
        };

        info!(
            "VirtualInventory: gate {} (epoch {})",
            transition.gate, transition.epoch
        );
        let scope = match transition.gate {
            GateState::Unlocked => AggregationScope::Full,
            GateState::Locked => AggregationScope::LocalOnly,
        };
        self.cache.invalidate_on(CacheEvent::ScopeChanged(scope));
        self.broadcaster.notify(transition);
    }
}
