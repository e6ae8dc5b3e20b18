use std::{default::Default, time::Duration};

use crate::backend::scan_provider::ScanRadius;

/// Contains Config properties which will be used by the AggregationCache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How far from the reference point backends are collected
    pub radius: ScanRadius,
    /// How long a snapshot may be reused across update cycles
    pub freshness_window: Duration,
    /// How far the reference point may drift before a snapshot from an
    /// earlier cycle is considered stale
    pub distance_threshold: f32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            radius: ScanRadius::Unlimited,
            freshness_window: Duration::from_millis(500),
            distance_threshold: 1.0,
        }
    }
}
