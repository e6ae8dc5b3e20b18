use std::{collections::HashMap, sync::Arc};

use log::debug;

use crate::{
    backend::{
        backend::Backend,
        backend_access::{eligible_stacks, guarded, read_slots},
        backend_ref::BackendRef,
        category::BackendScope,
    },
    priority::priority_orderer::PriorityOrder,
    types::ItemType,
};

/// Which backends take part in aggregation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregationScope {
    /// Every backend in range
    Full,
    /// Only the local participant's own storage; used while the trust gate
    /// is locked
    LocalOnly,
}

impl AggregationScope {
    pub fn admits(&self, scope: BackendScope) -> bool {
        match self {
            AggregationScope::Full => true,
            AggregationScope::LocalOnly => scope == BackendScope::Local,
        }
    }
}

/// What one backend added to a snapshot
#[derive(Clone, Debug)]
pub struct BackendContribution {
    pub backend: BackendRef,
    pub items: HashMap<ItemType, u64>,
}

/// Item totals from exactly one full scan, with the backends that produced
/// them in priority order. Immutable once built.
#[derive(Debug)]
pub struct AggregationSnapshot {
    scope: AggregationScope,
    totals: HashMap<ItemType, u64>,
    contributions: Vec<BackendContribution>,
}

impl AggregationSnapshot {
    pub fn empty(scope: AggregationScope) -> Self {
        Self {
            scope,
            totals: HashMap::new(),
            contributions: Vec::new(),
        }
    }

    /// Reads every admitted backend once, visiting categories in `order`.
    /// A backend that fails to read contributes nothing.
    pub fn scan(
        backends: &[Arc<dyn Backend>],
        order: &PriorityOrder,
        scope: AggregationScope,
    ) -> Self {
        let mut refs: Vec<BackendRef> = backends
            .iter()
            .filter(|backend| scope.admits(backend.scope()))
            .map(BackendRef::new)
            .collect();
        order.sort_backends(&mut refs);

        let mut snapshot = Self::empty(scope);

        for backend_ref in refs {
            let Ok(backend) = backend_ref.upgrade() else {
                continue;
            };
            let slots = match guarded(backend.id(), || read_slots(backend.as_ref())) {
                Ok(slots) => slots,
                Err(error) => {
                    debug!("AggregationCache: skipping {}: {}", backend_ref.id(), error);
                    continue;
                }
            };

            let mut items: HashMap<ItemType, u64> = HashMap::new();
            for (_, stack) in eligible_stacks(backend.as_ref(), &slots) {
                *items.entry(stack.item.clone()).or_insert(0) += u64::from(stack.count);
            }
            for (item, count) in &items {
                *snapshot.totals.entry(item.clone()).or_insert(0) += count;
            }

            snapshot.contributions.push(BackendContribution {
                backend: backend_ref,
                items,
            });
        }

        snapshot
    }

    pub fn scope(&self) -> AggregationScope {
        self.scope
    }

    pub fn count(&self, item: &ItemType) -> u64 {
        self.totals.get(item).copied().unwrap_or(0)
    }

    pub fn totals(&self) -> &HashMap<ItemType, u64> {
        &self.totals
    }

    pub fn contributions(&self) -> &[BackendContribution] {
        &self.contributions
    }

    /// Contributing backends in priority order
    pub fn backends(&self) -> impl Iterator<Item = &BackendRef> {
        self.contributions.iter().map(|c| &c.backend)
    }
}
