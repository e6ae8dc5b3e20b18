use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the LockBroadcaster
#[derive(Clone, Debug)]
pub struct BroadcastConfig {
    /// Grace period after the gate reopens during which nothing is sent;
    /// notifications are held and flushed once it passes
    pub early_window: Duration,
    /// Consecutive send failures before a warning is logged
    pub warn_after_failures: u32,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            early_window: Duration::from_secs(1),
            warn_after_failures: 3,
        }
    }
}
