use std::sync::Arc;

use log::{debug, warn};

use crate::{
    backend::{
        backend::Backend,
        backend_access::{
            available, credit_slot, debit_slot, eligible_stacks, guarded, read_slots, SlotWrite,
        },
        backend_ref::BackendRef,
        item_stack::ItemStack,
    },
    types::ItemType,
};

use super::debit_receipt::{DebitReceipt, RemovedStack};

struct SlotTake {
    backend: Arc<dyn Backend>,
    slot: usize,
    stack: ItemStack,
    written: SlotWrite,
}

/// Every slot write made during one debit batch, so the batch can be undone
/// if a later ingredient comes up short
#[derive(Default)]
pub struct DebitLedger {
    takes: Vec<SlotTake>,
    receipt: DebitReceipt,
}

impl DebitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes up to `needed` of `item` from one backend, slot by slot.
    ///
    /// Returns how much was taken. A backend that vanished or rejects a write
    /// simply stops contributing; whatever it already gave stays recorded.
    pub fn take_from(&mut self, backend_ref: &BackendRef, item: &ItemType, needed: u64) -> u64 {
        if needed == 0 {
            return 0;
        }

        let backend = match backend_ref.upgrade() {
            Ok(backend) => backend,
            Err(error) => {
                debug!("ItemOperations: {}", error);
                return 0;
            }
        };

        let slots = match guarded(backend.id(), || read_slots(backend.as_ref())) {
            Ok(slots) => slots,
            Err(error) => {
                debug!("ItemOperations: skipping {}: {}", backend_ref.id(), error);
                return 0;
            }
        };

        if available(backend.as_ref(), &slots, item) == 0 {
            return 0;
        }

        let mut taken: u64 = 0;
        for (slot, stack) in eligible_stacks(backend.as_ref(), &slots) {
            if taken >= needed {
                break;
            }
            if stack.item != *item {
                continue;
            }

            let amount = (needed - taken).min(u64::from(stack.count));
            // amount <= stack.count, which is a u32
            let take = ItemStack::new(item.clone(), amount as u32);

            let written = match guarded(backend.id(), || debit_slot(backend.as_ref(), slot, &take)) {
                Ok(written) => written,
                Err(error) => {
                    debug!(
                        "ItemOperations: {} slot {} rejected debit: {}",
                        backend_ref.id(),
                        slot,
                        error
                    );
                    break;
                }
            };

            taken += amount;
            self.receipt
                .record_take(backend_ref.id(), backend_ref.category(), item, amount);
            self.takes.push(SlotTake {
                backend: backend.clone(),
                slot,
                stack: take,
                written,
            });
        }

        taken
    }

    pub fn record_removed(&mut self, item: &ItemType, count: u64) {
        self.receipt.removed.push(RemovedStack {
            item: item.clone(),
            count,
        });
    }

    pub fn into_receipt(self) -> DebitReceipt {
        self.receipt
    }

    /// Credits every take back, newest first
    pub fn rollback(self) {
        for take in self.takes.into_iter().rev() {
            let backend_id = take.backend.id();
            let result = guarded(backend_id, || {
                credit_slot(take.backend.as_ref(), take.slot, &take.stack, take.written)
            });
            if let Err(error) = result {
                warn!(
                    "ItemOperations: failed to return {} {} to {} slot {}: {}",
                    take.stack.count, take.stack.item, backend_id, take.slot, error
                );
            }
        }
    }
}
