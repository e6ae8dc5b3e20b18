use std::default::Default;

use crate::{
    backend::scan_provider::ScanRadius, broadcast::broadcast_config::BroadcastConfig,
    cache::cache_config::CacheConfig, handshake::handshake_config::HandshakeConfig,
};

/// Contains Config properties which will be used by a VirtualInventory.
///
/// Holds already-parsed values; reading them from a file is the host's job.
#[derive(Clone, Debug, Default)]
pub struct StockpileConfig {
    /// `(category name, sort key)` pairs in file order. Names are matched
    /// leniently, keys sort numbers first.
    pub priority: Vec<(String, String)>,
    /// Used to configure snapshot reuse and scan range
    pub cache: CacheConfig,
    /// Used to configure the peer trust handshake
    pub handshake: HandshakeConfig,
    /// Used to configure gate state propagation
    pub broadcast: BroadcastConfig,
}

impl StockpileConfig {
    /// Sets the scan range from its configured value; negative means
    /// unlimited
    pub fn with_range(mut self, range: f32) -> Self {
        self.cache.radius = ScanRadius::from_config(range);
        self
    }

    pub fn with_priority<K: Into<String>, V: Into<String>>(
        mut self,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.priority = entries
            .into_iter()
            .map(|(name, key)| (name.into(), key.into()))
            .collect();
        self
    }
}
