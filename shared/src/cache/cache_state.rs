use std::{sync::Arc, time::Duration};

use crate::types::{Cycle, Position};

use super::{
    cache_config::CacheConfig,
    snapshot::{AggregationScope, AggregationSnapshot},
};

/// The current snapshot and the conditions it was built under
pub struct CacheState {
    snapshot: Option<Arc<AggregationSnapshot>>,
    built_at: Duration,
    built_cycle: Cycle,
    reference: Position,
    generation: u64,
}

impl CacheState {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            built_at: Duration::ZERO,
            built_cycle: 0,
            reference: Position::default(),
            generation: 0,
        }
    }

    pub fn publish(
        &mut self,
        snapshot: Arc<AggregationSnapshot>,
        built_at: Duration,
        built_cycle: Cycle,
        reference: Position,
        generation: u64,
    ) {
        self.snapshot = Some(snapshot);
        self.built_at = built_at;
        self.built_cycle = built_cycle;
        self.reference = reference;
        self.generation = generation;
    }

    /// Returns the snapshot if it may be reused.
    ///
    /// An invalidation or a change of scope always forces a rebuild. Past
    /// that, the cycle is checked first: within the build cycle the snapshot
    /// is reused unconditionally. In later cycles it is reused only while
    /// fresh and while the reference point stays close.
    pub fn reusable(
        &self,
        config: &CacheConfig,
        now: Duration,
        cycle: Cycle,
        reference: &Position,
        generation: u64,
        scope: AggregationScope,
    ) -> Option<Arc<AggregationSnapshot>> {
        let snapshot = self.snapshot.as_ref()?;

        if self.generation != generation || snapshot.scope() != scope {
            return None;
        }

        if cycle == self.built_cycle {
            return Some(snapshot.clone());
        }

        let elapsed = now.saturating_sub(self.built_at);
        if elapsed < config.freshness_window
            && self.reference.distance(reference) <= config.distance_threshold
        {
            return Some(snapshot.clone());
        }

        None
    }
}

impl Default for CacheState {
    fn default() -> Self {
        Self::new()
    }
}
