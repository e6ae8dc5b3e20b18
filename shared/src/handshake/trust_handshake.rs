use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use log::{info, warn};

use crate::{clock::Clock, types::PeerId};

use super::{
    error::HandshakeError,
    gate::{GateSource, GateState, GateTransition},
    handshake_config::HandshakeConfig,
    lock_report::LockReport,
    peer_trust_record::{PeerTrustRecord, TrustState},
};

struct TrustTable {
    records: BTreeMap<PeerId, PeerTrustRecord>,
    gate: GateState,
    epoch: u64,
}

impl TrustTable {
    /// Recomputes the gate, returning the transition if it flipped
    fn reevaluate(&mut self) -> Option<GateTransition> {
        let gate = if self.records.values().all(PeerTrustRecord::is_verified) {
            GateState::Unlocked
        } else {
            GateState::Locked
        };

        if gate == self.gate {
            return None;
        }
        self.gate = gate;
        self.epoch += 1;
        Some(GateTransition::new(gate, self.epoch))
    }
}

/// Decides, per connected peer, whether aggregation may go beyond local
/// storage.
///
/// Guilty until proven innocent: a peer is Pending from the moment it joins,
/// and any non-Verified peer locks the gate for the whole session, because
/// every participant sharing world state must compute identical totals.
pub struct TrustHandshake {
    clock: Arc<dyn Clock>,
    config: HandshakeConfig,
    table: RwLock<TrustTable>,
}

impl TrustHandshake {
    pub fn new(clock: Arc<dyn Clock>, config: HandshakeConfig) -> Self {
        Self {
            clock,
            config,
            table: RwLock::new(TrustTable {
                records: BTreeMap::new(),
                gate: GateState::Unlocked,
                epoch: 0,
            }),
        }
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// A participant connected. The gate closes immediately.
    pub fn peer_joined(&self, peer: PeerId) -> Result<Option<GateTransition>, HandshakeError> {
        let now = self.clock.now();
        let mut table = self.write_table();

        if table.records.contains_key(&peer) {
            return Err(HandshakeError::AlreadyJoined { peer });
        }

        info!("TrustHandshake: {} joined, awaiting acknowledgement", peer);
        table.records.insert(peer, PeerTrustRecord::new(peer, now));
        Ok(table.reevaluate())
    }

    /// A participant acknowledged with `version`.
    ///
    /// Only a Pending peer inside the timeout window with an accepted version
    /// becomes Verified. A late acknowledgement times the peer out instead.
    pub fn acknowledge(
        &self,
        peer: PeerId,
        version: &str,
    ) -> Result<Option<GateTransition>, HandshakeError> {
        let now = self.clock.now();
        let timeout = self.config.timeout;
        let accepted = self.config.accepts(version);
        let mut table = self.write_table();

        let Some(record) = table.records.get_mut(&peer) else {
            return Err(HandshakeError::UnknownPeer { peer });
        };

        if record.state != TrustState::Pending {
            return Err(HandshakeError::NotPending {
                peer,
                state: record.state.name(),
            });
        }

        if now.saturating_sub(record.first_seen) >= timeout {
            record.state = TrustState::TimedOut;
            warn!(
                "TrustHandshake: {} acknowledged after the timeout window, marked timed out",
                peer
            );
            return Err(HandshakeError::NotPending {
                peer,
                state: TrustState::TimedOut.name(),
            });
        }

        if !accepted {
            record.protocol_version = Some(version.to_string());
            warn!(
                "TrustHandshake: {} reported incompatible protocol version '{}'",
                peer, version
            );
            return Err(HandshakeError::IncompatibleVersion {
                peer,
                version: version.to_string(),
            });
        }

        record.state = TrustState::Verified;
        record.protocol_version = Some(version.to_string());
        info!("TrustHandshake: {} verified ({})", peer, version);

        Ok(table.reevaluate())
    }

    /// A participant disconnected. Its record goes away whatever its state.
    pub fn peer_left(&self, peer: PeerId) -> Result<Option<GateTransition>, HandshakeError> {
        let mut table = self.write_table();

        if table.records.remove(&peer).is_none() {
            return Err(HandshakeError::UnknownPeer { peer });
        }

        info!("TrustHandshake: {} left", peer);
        Ok(table.reevaluate())
    }

    /// Times out every Pending peer whose window has elapsed. No retry is
    /// attempted here. Returns the peers that timed out on this call.
    pub fn update(&self) -> Vec<PeerId> {
        let now = self.clock.now();
        let timeout = self.config.timeout;
        let mut table = self.write_table();

        let mut expired = Vec::new();
        for record in table.records.values_mut() {
            if record.state == TrustState::Pending
                && now.saturating_sub(record.first_seen) >= timeout
            {
                record.state = TrustState::TimedOut;
                expired.push(record.peer);
                warn!(
                    "TrustHandshake: {} never acknowledged, it is missing compatible inventory aggregation; staying locked",
                    record.peer
                );
            }
        }

        expired
    }

    pub fn gate(&self) -> GateState {
        self.read_records(|table| table.gate)
    }

    /// The current gate stamped with the epoch of its last flip
    pub fn transition(&self) -> GateTransition {
        self.read_records(|table| GateTransition::new(table.gate, table.epoch))
    }

    pub fn state_of(&self, peer: PeerId) -> Option<TrustState> {
        self.read_records(|table| table.records.get(&peer).map(|record| record.state))
    }

    /// Copy of every record, ordered by peer id
    pub fn records(&self) -> Vec<PeerTrustRecord> {
        self.read_records(|table| table.records.values().cloned().collect())
    }

    /// Records holding the gate shut
    pub fn unverified_peers(&self) -> Vec<PeerTrustRecord> {
        self.read_records(|table| {
            table
                .records
                .values()
                .filter(|record| !record.is_verified())
                .cloned()
                .collect()
        })
    }

    pub fn lock_report(&self) -> LockReport {
        self.read_records(|table| LockReport {
            gate: table.gate,
            unverified: table
                .records
                .values()
                .filter(|record| !record.is_verified())
                .cloned()
                .collect(),
        })
    }

    fn write_table(&self) -> std::sync::RwLockWriteGuard<'_, TrustTable> {
        // a panic can only come from inside this type's own short critical
        // sections, which leave the table consistent
        match self.table.write() {
            Ok(table) => table,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_records<T>(&self, read: impl FnOnce(&TrustTable) -> T) -> T {
        match self.table.read() {
            Ok(table) => read(&table),
            Err(poisoned) => read(&poisoned.into_inner()),
        }
    }
}

impl GateSource for TrustHandshake {
    fn gate_state(&self) -> GateState {
        self.gate()
    }
}
