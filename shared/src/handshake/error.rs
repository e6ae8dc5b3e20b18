use thiserror::Error;

use crate::types::PeerId;

/// Errors that can occur while driving the peer trust handshake.
///
/// None of these change the gate; a rejected acknowledgement leaves the peer
/// Pending until it times out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// Event for a peer that never joined or already left
    #[error("{peer} is not a connected participant")]
    UnknownPeer { peer: PeerId },

    /// Join reported twice for the same peer
    #[error("{peer} already joined")]
    AlreadyJoined { peer: PeerId },

    /// Acknowledgement carried a version token outside the accepted set
    #[error("{peer} acknowledged with incompatible protocol version '{version}'")]
    IncompatibleVersion { peer: PeerId, version: String },

    /// Acknowledgement for a peer that is no longer Pending
    #[error("{peer} cannot be verified from state {state}")]
    NotPending { peer: PeerId, state: &'static str },
}
