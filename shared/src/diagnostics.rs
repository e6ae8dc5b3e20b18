use std::fmt;

use crate::{
    broadcast::lock_broadcaster::BroadcastStats,
    cache::cache_stats::CacheReport,
    handshake::{gate::GateState, lock_report::LockReport, peer_trust_record::PeerTrustRecord},
    priority::priority_orderer::{OrderDiagnostic, PriorityOrder},
};

/// Read-only operator view. Everything here is derived; nothing is
/// authoritative.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    pub gate: GateState,
    pub unverified: Vec<PeerTrustRecord>,
    pub order: PriorityOrder,
    pub order_notes: Vec<OrderDiagnostic>,
    pub cache: CacheReport,
    pub broadcast: BroadcastStats,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = LockReport {
            gate: self.gate,
            unverified: self.unverified.clone(),
        };
        writeln!(f, "gate: {}", report)?;
        writeln!(f, "priority: {}", self.order)?;
        for note in &self.order_notes {
            writeln!(f, "  {}", note)?;
        }
        writeln!(
            f,
            "cache: {} hits, {} misses, {} invalidations",
            self.cache.hits, self.cache.misses, self.cache.invalidations
        )?;
        write!(
            f,
            "broadcast: {} sent, {} failed, {} deferred, {} superseded",
            self.broadcast.sent,
            self.broadcast.failures,
            self.broadcast.deferred,
            self.broadcast.superseded
        )
    }
}
