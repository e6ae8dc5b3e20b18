use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, RwLock,
};

use log::{debug, trace, warn};

use crate::{
    backend::scan_provider::ScanProvider,
    clock::Clock,
    priority::priority_orderer::PriorityOrder,
    types::{ItemType, Position},
};

use super::{
    cache_config::CacheConfig,
    cache_state::CacheState,
    cache_stats::{CacheReport, CacheStats},
    invalidation::{CacheEvent, InvalidationListeners, SubscriptionId},
    snapshot::{AggregationScope, AggregationSnapshot},
};

/// Coalesces repeated inventory queries into one scan per update cycle.
///
/// Queries inside the cycle a snapshot was built in always reuse it. Across
/// cycles a snapshot is reused while it is fresh and the reference point
/// has not moved far. Any [`CacheEvent`] discards it.
pub struct AggregationCache {
    provider: Arc<dyn ScanProvider>,
    clock: Arc<dyn Clock>,
    order: PriorityOrder,
    config: CacheConfig,
    state: RwLock<CacheState>,
    rebuild_lock: Mutex<()>,
    generation: AtomicU64,
    listeners: InvalidationListeners,
    stats: CacheStats,
}

impl AggregationCache {
    pub fn new(
        provider: Arc<dyn ScanProvider>,
        clock: Arc<dyn Clock>,
        order: PriorityOrder,
        config: CacheConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            order,
            config,
            state: RwLock::new(CacheState::new()),
            rebuild_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            listeners: InvalidationListeners::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn order(&self) -> PriorityOrder {
        self.order
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Total of `item` across every backend in range
    pub fn query(&self, reference: &Position, item: &ItemType) -> u64 {
        self.query_in(reference, AggregationScope::Full, item)
    }

    pub fn query_in(&self, reference: &Position, scope: AggregationScope, item: &ItemType) -> u64 {
        self.snapshot(reference, scope).count(item)
    }

    /// Returns a reusable snapshot, rebuilding it at most once no matter
    /// how many threads ask at the same time
    pub fn snapshot(&self, reference: &Position, scope: AggregationScope) -> Arc<AggregationSnapshot> {
        if let Some(snapshot) = self.reusable(reference, scope) {
            self.stats.record_hit();
            return snapshot;
        }

        let Ok(_rebuilding) = self.rebuild_lock.lock() else {
            warn!("AggregationCache: rebuild lock poisoned, scanning without publishing");
            self.stats.record_miss();
            return Arc::new(self.scan(reference, scope));
        };

        // another caller may have rebuilt while we waited
        if let Some(snapshot) = self.reusable(reference, scope) {
            self.stats.record_hit();
            return snapshot;
        }

        self.stats.record_miss();

        let generation = self.generation.load(Ordering::Acquire);
        let built_at = self.clock.now();
        let built_cycle = self.clock.cycle();
        let snapshot = Arc::new(self.scan(reference, scope));

        match self.state.write() {
            Ok(mut state) => state.publish(
                snapshot.clone(),
                built_at,
                built_cycle,
                *reference,
                generation,
            ),
            Err(_) => warn!("AggregationCache: state lock poisoned, snapshot not published"),
        }

        snapshot
    }

    pub fn invalidate(&self) {
        self.invalidate_on(CacheEvent::Manual);
    }

    /// Discards the current snapshot and tells every subscriber why
    pub fn invalidate_on(&self, event: CacheEvent) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.stats.record_invalidation();
        trace!("AggregationCache: invalidated by {:?}", event);
        self.listeners.notify(&event);
    }

    pub fn on_invalidated(
        &self,
        callback: impl Fn(&CacheEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(Arc::new(callback))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn stats(&self) -> CacheReport {
        self.stats.report()
    }

    fn reusable(&self, reference: &Position, scope: AggregationScope) -> Option<Arc<AggregationSnapshot>> {
        let state = self.state.read().ok()?;
        state.reusable(
            &self.config,
            self.clock.now(),
            self.clock.cycle(),
            reference,
            self.generation.load(Ordering::Acquire),
            scope,
        )
    }

    fn scan(&self, reference: &Position, scope: AggregationScope) -> AggregationSnapshot {
        let backends = self.provider.enumerate_backends(reference, self.config.radius);
        let snapshot = AggregationSnapshot::scan(&backends, &self.order, scope);
        debug!(
            "AggregationCache: rebuilt {:?} snapshot from {} of {} backends, {} item types",
            scope,
            snapshot.contributions().len(),
            backends.len(),
            snapshot.totals().len()
        );
        snapshot
    }
}
