use thiserror::Error;

/// Errors returned to gameplay call sites by `has` and `debit`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Malformed request, e.g. a negative count. A local contract violation,
    /// never reported to remote peers.
    #[error("Invalid request for {item}: {reason}")]
    InvalidArgument { item: String, reason: &'static str },

    /// Not enough of an item is visible. An expected outcome, not a fault:
    /// no backend was left modified.
    #[error("Insufficient {item}: {required} required, {available} available")]
    InsufficientStock {
        item: String,
        required: u64,
        available: u64,
    },
}
