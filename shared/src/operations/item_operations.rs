use std::sync::{Arc, Mutex, RwLock};

use log::{debug, warn};

use crate::{
    backend::backend_ref::BackendRef,
    cache::{
        aggregation_cache::AggregationCache,
        invalidation::CacheEvent,
        snapshot::{AggregationScope, AggregationSnapshot},
    },
    handshake::gate::{GateSource, GateState},
    priority::priority_orderer::PriorityOrder,
    types::{ItemType, Position},
};

use super::{
    debit_ledger::DebitLedger,
    debit_receipt::DebitReceipt,
    error::OperationError,
    item_request::{merged_requirements, ItemRequest},
};

/// Count, check and remove items across every backend in range.
///
/// Each call first reads the trust gate. While it is locked, only the local
/// participant's own storage is visible.
pub struct ItemOperations {
    cache: Arc<AggregationCache>,
    gate: Arc<dyn GateSource>,
    reference: RwLock<Position>,
    debit_lock: Mutex<()>,
}

impl ItemOperations {
    pub fn new(cache: Arc<AggregationCache>, gate: Arc<dyn GateSource>) -> Self {
        Self {
            cache,
            gate,
            reference: RwLock::new(Position::default()),
            debit_lock: Mutex::new(()),
        }
    }

    /// Moves the point scans are centered on, typically the player
    pub fn set_reference_point(&self, position: Position) {
        match self.reference.write() {
            Ok(mut reference) => *reference = position,
            Err(poisoned) => *poisoned.into_inner() = position,
        }
    }

    pub fn reference_point(&self) -> Position {
        match self.reference.read() {
            Ok(reference) => *reference,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn scope(&self) -> AggregationScope {
        match self.gate.gate_state() {
            GateState::Unlocked => AggregationScope::Full,
            GateState::Locked => AggregationScope::LocalOnly,
        }
    }

    pub fn count(&self, item: &ItemType) -> u64 {
        self.snapshot().count(item)
    }

    /// Whether every request is covered `multiplier` times over.
    /// Stops at the first request that is not.
    pub fn has(&self, requests: &[ItemRequest], multiplier: i32) -> Result<bool, OperationError> {
        let snapshot = self.snapshot();
        for request in requests {
            let required = request.required(multiplier)?;
            if required > 0 && snapshot.count(&request.item) < required {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Removes every request `multiplier` times over, walking backends in
    /// the configured priority order
    pub fn debit(
        &self,
        requests: &[ItemRequest],
        multiplier: i32,
    ) -> Result<DebitReceipt, OperationError> {
        self.debit_in_order(requests, multiplier, None)
    }

    /// Like [`ItemOperations::debit`], but visits backend categories in
    /// `order` for call sites that need a different drain order
    pub fn debit_with_order(
        &self,
        requests: &[ItemRequest],
        multiplier: i32,
        order: &PriorityOrder,
    ) -> Result<DebitReceipt, OperationError> {
        self.debit_in_order(requests, multiplier, Some(order))
    }

    fn debit_in_order(
        &self,
        requests: &[ItemRequest],
        multiplier: i32,
        order: Option<&PriorityOrder>,
    ) -> Result<DebitReceipt, OperationError> {
        let requirements = merged_requirements(requests, multiplier)?;

        let outcome = {
            let _debiting = match self.debit_lock.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            self.walk(&requirements, order)
        };

        // the debit lock is released before subscribers run
        match &outcome {
            Ok(receipt) if receipt.takes.is_empty() => {}
            Ok(_) => self.cache.invalidate_on(CacheEvent::DebitCompleted),
            Err(WalkFailure::Precheck(_)) => {}
            Err(WalkFailure::Exhausted(_)) => self.cache.invalidate_on(CacheEvent::DebitCompleted),
        }

        outcome.map_err(WalkFailure::into_error)
    }

    fn walk(
        &self,
        requirements: &[(ItemType, u64)],
        order: Option<&PriorityOrder>,
    ) -> Result<DebitReceipt, WalkFailure> {
        let snapshot = self.snapshot();

        for (item, required) in requirements {
            let available = snapshot.count(item);
            if available < *required {
                debug!(
                    "ItemOperations: cannot debit {} {}, only {} visible",
                    required, item, available
                );
                return Err(WalkFailure::Precheck(OperationError::InsufficientStock {
                    item: item.to_string(),
                    required: *required,
                    available,
                }));
            }
        }

        let mut backends: Vec<BackendRef> = snapshot.backends().cloned().collect();
        if let Some(order) = order {
            order.sort_backends(&mut backends);
        }

        let mut ledger = DebitLedger::new();
        for (item, required) in requirements {
            let mut remaining = *required;
            for backend in &backends {
                if remaining == 0 {
                    break;
                }
                remaining -= ledger.take_from(backend, item, remaining);
            }

            if remaining > 0 {
                let taken = required - remaining;
                warn!(
                    "ItemOperations: backends changed under debit, found {} of {} {}; rolling back",
                    taken, required, item
                );
                ledger.rollback();
                return Err(WalkFailure::Exhausted(OperationError::InsufficientStock {
                    item: item.to_string(),
                    required: *required,
                    available: taken,
                }));
            }

            ledger.record_removed(item, *required);
        }

        Ok(ledger.into_receipt())
    }

    fn snapshot(&self) -> Arc<AggregationSnapshot> {
        let scope = self.scope();
        self.cache.snapshot(&self.reference_point(), scope)
    }
}

enum WalkFailure {
    /// Rejected before any backend was touched
    Precheck(OperationError),
    /// Backends held less than the snapshot promised; every take was undone
    Exhausted(OperationError),
}

impl WalkFailure {
    fn into_error(self) -> OperationError {
        match self {
            WalkFailure::Precheck(error) | WalkFailure::Exhausted(error) => error,
        }
    }
}
