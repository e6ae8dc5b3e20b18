pub mod aggregation_cache;
pub mod cache_config;
pub mod cache_state;
pub mod cache_stats;
pub mod invalidation;
pub mod snapshot;
