//! Read and write helpers that pick the right view of a [`Backend`].
//!
//! Every read or write the core performs on a backend goes through here so
//! the live-view rules live in one place.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, warn};

use crate::types::{BackendId, ItemType};

use super::{
    backend::Backend,
    error::BackendError,
    item_stack::{ItemStack, Slots},
};

/// Runs one backend call, turning a panic inside host code into
/// [`BackendError::Unavailable`] so a single misbehaving backend is skipped
/// rather than taking the caller down
pub fn guarded<T>(
    backend: BackendId,
    call: impl FnOnce() -> Result<T, BackendError>,
) -> Result<T, BackendError> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(_) => {
            warn!("Backend: {} panicked during access, treating as unavailable", backend);
            Err(BackendError::Unavailable { backend })
        }
    }
}

/// Reads the authoritative slot array: the live view while the backend is
/// viewed, resting storage otherwise.
pub fn read_slots(backend: &dyn Backend) -> Result<Slots, BackendError> {
    if backend.is_viewed() {
        backend.live_read()
    } else {
        backend.resting_read()
    }
}

/// Yields `(slot index, stack)` for every occupied slot inside the
/// backend's eligible range
pub fn eligible_stacks<'a>(
    backend: &dyn Backend,
    slots: &'a Slots,
) -> impl Iterator<Item = (usize, &'a ItemStack)> + 'a {
    let range = backend.eligible_slots().unwrap_or(0..slots.len());
    slots
        .iter()
        .enumerate()
        .filter(move |(index, _)| range.contains(index))
        .filter_map(|(index, slot)| slot.as_ref().map(|stack| (index, stack)))
        .filter(|(_, stack)| stack.count > 0)
}

/// Total of `item` across the eligible slots
pub fn available(backend: &dyn Backend, slots: &Slots, item: &ItemType) -> u64 {
    eligible_stacks(backend, slots)
        .filter(|(_, stack)| stack.item == *item)
        .map(|(_, stack)| u64::from(stack.count))
        .sum()
}

/// Which views a slot write reached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotWrite {
    pub live: bool,
    pub resting: bool,
}

/// Removes `stack` from one slot.
///
/// An unviewed backend is written in resting storage. While the backend is
/// viewed the live write is the one that counts and must succeed; resting
/// storage is mirrored only if it still holds the item, since the view
/// buffer replaces it when the view closes.
pub fn debit_slot(
    backend: &dyn Backend,
    slot: usize,
    stack: &ItemStack,
) -> Result<SlotWrite, BackendError> {
    if !backend.is_viewed() {
        backend.resting_debit(slot, stack)?;
        return Ok(SlotWrite {
            live: false,
            resting: true,
        });
    }

    backend.live_debit(slot, stack)?;

    let resting = match backend.resting_debit(slot, stack) {
        Ok(()) => true,
        Err(error) => {
            debug!(
                "Backend: {} resting storage not mirrored for slot {}: {}",
                backend.id(),
                slot,
                error
            );
            false
        }
    };

    Ok(SlotWrite {
        live: true,
        resting,
    })
}

/// Returns `stack` to exactly the views `written` took it from. Both views
/// are attempted; the first failure is reported.
pub fn credit_slot(
    backend: &dyn Backend,
    slot: usize,
    stack: &ItemStack,
    written: SlotWrite,
) -> Result<(), BackendError> {
    let live = if written.live {
        backend.live_credit(slot, stack)
    } else {
        Ok(())
    };
    let resting = if written.resting {
        backend.resting_credit(slot, stack)
    } else {
        Ok(())
    };
    live.and(resting)
}
