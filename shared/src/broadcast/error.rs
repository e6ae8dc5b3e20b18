use thiserror::Error;

/// Errors that can occur while sending gate state to peers.
///
/// Never propagated past the LockBroadcaster: gate messages are advisory,
/// each participant enforces its own handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport rejected or failed to deliver the message
    #[error("Failed to send gate state: {reason}")]
    SendFailed { reason: String },

    /// The transport panicked while sending
    #[error("Transport panicked while sending gate state")]
    Panicked,
}
