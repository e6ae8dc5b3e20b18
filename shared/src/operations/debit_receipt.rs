use crate::{
    backend::category::BackendCategory,
    types::{BackendId, ItemType},
};

/// Amount of one item removed by a debit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedStack {
    pub item: ItemType,
    pub count: u64,
}

/// Amount of one item taken from one backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendTake {
    pub backend: BackendId,
    pub category: BackendCategory,
    pub item: ItemType,
    pub count: u64,
}

/// What a successful debit removed, and from where
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebitReceipt {
    /// One entry per distinct requested item, in request order
    pub removed: Vec<RemovedStack>,
    /// Per backend and item, in the order backends were visited
    pub takes: Vec<BackendTake>,
}

impl DebitReceipt {
    pub fn removed(&self, item: &ItemType) -> u64 {
        self.removed
            .iter()
            .filter(|stack| stack.item == *item)
            .map(|stack| stack.count)
            .sum()
    }

    pub fn taken_from(&self, backend: BackendId) -> u64 {
        self.takes
            .iter()
            .filter(|take| take.backend == backend)
            .map(|take| take.count)
            .sum()
    }

    /// `(category, count)` pairs in visiting order, for a single item
    pub fn takes_for(&self, item: &ItemType) -> Vec<(BackendCategory, u64)> {
        self.takes
            .iter()
            .filter(|take| take.item == *item)
            .map(|take| (take.category, take.count))
            .collect()
    }

    pub(crate) fn record_take(
        &mut self,
        backend: BackendId,
        category: BackendCategory,
        item: &ItemType,
        count: u64,
    ) {
        if let Some(last) = self.takes.last_mut() {
            if last.backend == backend && last.item == *item {
                last.count += count;
                return;
            }
        }
        self.takes.push(BackendTake {
            backend,
            category,
            item: item.clone(),
            count,
        });
    }
}
