use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};

use log::warn;

use crate::types::BackendId;

use super::snapshot::AggregationScope;

/// Why a snapshot can no longer be trusted.
///
/// These exist because a backend's contents can change through paths the
/// cache never observes, e.g. a UI buffer that is authoritative while the
/// backend is open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    BackendOpened(BackendId),
    BackendClosed(BackendId),
    SlotChanged { backend: BackendId, slot: usize },
    DebitCompleted,
    /// The trust gate flipped, so a different set of backends is visible
    ScopeChanged(AggregationScope),
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type InvalidationCallback = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Subscribers told about every invalidation (challenge trackers, UI)
#[derive(Default)]
pub struct InvalidationListeners {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, InvalidationCallback)>>,
}

impl InvalidationListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: InvalidationCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let Ok(mut listeners) = self.listeners.write() else {
            warn!("AggregationCache: listener list poisoned, subscription dropped");
            return id;
        };
        listeners.push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut listeners) = self.listeners.write() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Calls every subscriber outside the list lock, so a callback may
    /// subscribe or unsubscribe without deadlocking
    pub fn notify(&self, event: &CacheEvent) {
        let callbacks: Vec<InvalidationCallback> = match self.listeners.read() {
            Ok(listeners) => listeners.iter().map(|(_, cb)| cb.clone()).collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }
}
