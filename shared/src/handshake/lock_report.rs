use std::fmt;

use super::{gate::GateState, peer_trust_record::PeerTrustRecord};

/// Operator-facing account of the gate: its state and who is holding it shut
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockReport {
    pub gate: GateState,
    pub unverified: Vec<PeerTrustRecord>,
}

impl fmt::Display for LockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unverified.is_empty() {
            return write!(f, "{}", self.gate);
        }

        write!(f, "{}: waiting on", self.gate)?;
        for (index, record) in self.unverified.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            write!(f, "{}{} ({}", separator, record.peer, record.state.name())?;
            if let Some(version) = &record.protocol_version {
                write!(f, ", reported '{}'", version)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
