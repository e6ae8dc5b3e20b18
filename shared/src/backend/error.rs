use thiserror::Error;

use crate::types::BackendId;

/// Errors raised by a single storage backend.
///
/// Inside a scan or a debit walk these never abort the whole operation: the
/// offending backend is treated as holding nothing and the walk moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend was destroyed or unloaded after it was scanned
    #[error("{backend} is no longer available")]
    Unavailable { backend: BackendId },

    /// Slot index outside the backend's slot array
    #[error("Slot {slot} out of range on {backend} ({len} slots)")]
    SlotOutOfRange {
        backend: BackendId,
        slot: usize,
        len: usize,
    },

    /// Slot holds a different item than the operation expected
    #[error("Slot {slot} on {backend} holds {found}, expected {expected}")]
    SlotMismatch {
        backend: BackendId,
        slot: usize,
        expected: String,
        found: String,
    },

    /// Slot holds fewer items than the debit asked for
    #[error("Slot {slot} on {backend} holds {available}, cannot remove {requested}")]
    SlotUnderflow {
        backend: BackendId,
        slot: usize,
        requested: u32,
        available: u32,
    },

    /// Live-view access on a backend that is not being viewed
    #[error("{backend} has no live view buffer")]
    NoLiveView { backend: BackendId },

    /// Backend-specific read failure
    #[error("Failed to read {backend}: {reason}")]
    ReadFailed { backend: BackendId, reason: String },
}
