use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use log::{debug, warn};

use crate::{
    clock::Clock,
    handshake::gate::{GateState, GateTransition},
};

use super::{broadcast_config::BroadcastConfig, error::TransportError, lock_transport::LockTransport};

#[derive(Default)]
struct BroadcasterState {
    reopened_at: Option<Duration>,
    /// Epoch of the newest transition handed to `notify`
    latest_epoch: u64,
    /// Held back by the early window, or waiting for a retry
    queued: Option<GateTransition>,
    consecutive_failures: u32,
    warned: bool,
    stats: BroadcastStats,
}

/// Counters for operator diagnostics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    pub sent: u64,
    pub failures: u64,
    pub deferred: u64,
    /// Transitions dropped because a newer one had already arrived
    pub superseded: u64,
}

/// Tells peers when the local gate locks or unlocks.
///
/// Best effort only. Sends are held during the early window after a reopen,
/// failures are counted and retried on the next [`LockBroadcaster::update`],
/// and nothing here ever returns an error to the caller.
///
/// Transitions may arrive from several threads in any order. Each carries
/// the epoch of the flip that produced it; one older than the newest seen is
/// dropped, and sends are serialized, so the last state peers receive is
/// always the newest gate.
pub struct LockBroadcaster {
    transport: Arc<dyn LockTransport>,
    clock: Arc<dyn Clock>,
    config: BroadcastConfig,
    state: Mutex<BroadcasterState>,
    // held across the transport call; always taken before `state`
    sending: Mutex<()>,
}

impl LockBroadcaster {
    pub fn new(
        transport: Arc<dyn LockTransport>,
        clock: Arc<dyn Clock>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            transport,
            clock,
            config,
            state: Mutex::new(BroadcasterState::default()),
            sending: Mutex::new(()),
        }
    }

    pub fn notify(&self, transition: GateTransition) {
        let now = self.clock.now();
        {
            let mut state = self.lock_state();
            if transition.epoch <= state.latest_epoch {
                debug!(
                    "LockBroadcaster: dropping {} from epoch {}, already at epoch {}",
                    transition.gate, transition.epoch, state.latest_epoch
                );
                state.stats.superseded += 1;
                return;
            }
            state.latest_epoch = transition.epoch;

            if transition.gate == GateState::Unlocked {
                state.reopened_at = Some(now);
            }
            if self.in_early_window(&state, now) {
                debug!(
                    "LockBroadcaster: holding {} during early window",
                    transition.gate
                );
                state.queued = Some(transition);
                state.stats.deferred += 1;
                return;
            }
            // a newer state supersedes anything still queued
            state.queued = None;
        }

        self.send(transition);
    }

    /// Flushes a held or failed notification once it may be sent
    pub fn update(&self) {
        let now = self.clock.now();
        let transition = {
            let mut state = self.lock_state();
            if self.in_early_window(&state, now) {
                return;
            }
            match state.queued.take() {
                Some(transition) => transition,
                None => return,
            }
        };

        self.send(transition);
    }

    pub fn pending(&self) -> Option<GateState> {
        self.lock_state().queued.map(|transition| transition.gate)
    }

    pub fn stats(&self) -> BroadcastStats {
        self.lock_state().stats
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock_state().consecutive_failures
    }

    fn in_early_window(&self, state: &BroadcasterState, now: Duration) -> bool {
        match state.reopened_at {
            Some(reopened_at) => now.saturating_sub(reopened_at) < self.config.early_window,
            None => false,
        }
    }

    fn send(&self, transition: GateTransition) {
        let _sending = match self.sending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        {
            let mut state = self.lock_state();
            if transition.epoch < state.latest_epoch {
                debug!(
                    "LockBroadcaster: {} from epoch {} superseded before sending",
                    transition.gate, transition.epoch
                );
                state.stats.superseded += 1;
                return;
            }
        }

        let gate = transition.gate;
        let result = match catch_unwind(AssertUnwindSafe(|| self.transport.send_gate_state(gate))) {
            Ok(result) => result,
            Err(_) => Err(TransportError::Panicked),
        };

        let mut state = self.lock_state();
        match result {
            Ok(()) => {
                state.stats.sent += 1;
                state.consecutive_failures = 0;
                state.warned = false;
                debug!("LockBroadcaster: sent {}", gate);
            }
            Err(error) => {
                state.stats.failures += 1;
                state.consecutive_failures += 1;
                if state.queued.is_none() && transition.epoch == state.latest_epoch {
                    state.queued = Some(transition);
                }

                if state.consecutive_failures >= self.config.warn_after_failures && !state.warned {
                    state.warned = true;
                    warn!(
                        "LockBroadcaster: {} consecutive failures sending gate state, last: {}",
                        state.consecutive_failures, error
                    );
                } else {
                    debug!("LockBroadcaster: failed to send {}: {}", gate, error);
                }
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, BroadcasterState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
