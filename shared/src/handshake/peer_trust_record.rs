use std::time::Duration;

use crate::types::PeerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrustState {
    /// Joined, no compatible acknowledgement yet
    Pending,
    /// Acknowledged with an accepted protocol version
    Verified,
    /// Never acknowledged within the timeout window
    TimedOut,
}

impl TrustState {
    pub fn name(&self) -> &'static str {
        match self {
            TrustState::Pending => "Pending",
            TrustState::Verified => "Verified",
            TrustState::TimedOut => "TimedOut",
        }
    }
}

/// Trust state of one connected participant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerTrustRecord {
    pub peer: PeerId,
    pub state: TrustState,
    /// Clock time the peer was first observed
    pub first_seen: Duration,
    /// Version token from the peer's latest acknowledgement, kept even when
    /// it was rejected
    pub protocol_version: Option<String>,
}

impl PeerTrustRecord {
    pub fn new(peer: PeerId, first_seen: Duration) -> Self {
        Self {
            peer,
            state: TrustState::Pending,
            first_seen,
            protocol_version: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.state == TrustState::Verified
    }
}
