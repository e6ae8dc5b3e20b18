use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use crate::types::Cycle;

/// Source of time and update-cycle boundaries.
///
/// Injected into the cache, the handshake and the broadcaster so that tests
/// can drive time and frame boundaries deterministically.
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since the clock was created
    fn now(&self) -> Duration;
    /// Current logical update cycle
    fn cycle(&self) -> Cycle;
    /// Moves to the next update cycle, returning it
    fn advance_cycle(&self) -> Cycle;
}

/// A [`Clock`] that only moves when told to
#[derive(Default)]
pub struct ManualClock {
    nanos: AtomicU64,
    cycle: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::AcqRel);
    }

    pub fn set_cycle(&self, cycle: Cycle) {
        self.cycle.store(cycle, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }

    fn cycle(&self) -> Cycle {
        self.cycle.load(Ordering::Acquire)
    }

    fn advance_cycle(&self) -> Cycle {
        self.cycle.fetch_add(1, Ordering::AcqRel) + 1
    }
}
