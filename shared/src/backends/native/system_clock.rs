use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use crate::{clock::Clock, types::Cycle};

/// Wall-clock backed [`Clock`]; the update cycle is advanced by the host
/// once per simulation frame.
pub struct SystemClock {
    start: Instant,
    cycle: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            cycle: AtomicU64::new(0),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn cycle(&self) -> Cycle {
        self.cycle.load(Ordering::Acquire)
    }

    fn advance_cycle(&self) -> Cycle {
        self.cycle.fetch_add(1, Ordering::AcqRel) + 1
    }
}
