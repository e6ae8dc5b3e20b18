use std::ops::Range;

use crate::types::BackendId;

use super::{
    category::{BackendCategory, BackendScope},
    error::BackendError,
    item_stack::{ItemStack, Slots},
};

/// Capability the aggregator uses to read and mutate one storage location.
///
/// A backend keeps two views of its contents. Resting storage is what the
/// world persists. While a player has the backend open, a live view buffer
/// owned by the UI is authoritative and resting storage may lag behind it;
/// when the view closes the buffer is written back over resting storage.
/// Reads must therefore go through [`Backend::live_read`] whenever
/// [`Backend::is_viewed`] is set, and writes must land in the live view.
///
/// Debits carry the whole [`ItemStack`] so a backend can refuse a slot that
/// holds some other item with [`BackendError::SlotMismatch`].
pub trait Backend: Send + Sync {
    fn id(&self) -> BackendId;

    fn category(&self) -> BackendCategory;

    fn scope(&self) -> BackendScope {
        BackendScope::Shared
    }

    /// Slots that take part in aggregation. `None` means every slot.
    /// Workstations only expose their output slots.
    fn eligible_slots(&self) -> Option<Range<usize>> {
        None
    }

    /// Whether a live view buffer is currently authoritative
    fn is_viewed(&self) -> bool {
        false
    }

    fn resting_read(&self) -> Result<Slots, BackendError>;

    fn resting_debit(&self, slot: usize, stack: &ItemStack) -> Result<(), BackendError>;

    fn resting_credit(&self, slot: usize, stack: &ItemStack) -> Result<(), BackendError>;

    fn live_read(&self) -> Result<Slots, BackendError> {
        Err(BackendError::NoLiveView { backend: self.id() })
    }

    fn live_debit(&self, _slot: usize, _stack: &ItemStack) -> Result<(), BackendError> {
        Err(BackendError::NoLiveView { backend: self.id() })
    }

    fn live_credit(&self, _slot: usize, _stack: &ItemStack) -> Result<(), BackendError> {
        Err(BackendError::NoLiveView { backend: self.id() })
    }
}
