use std::{default::Default, time::Duration};

/// Version token this build announces and accepts by default
pub const PROTOCOL_VERSION: &str = "stockpile/1";

/// Contains Config properties which will be used by the TrustHandshake
#[derive(Clone, Debug)]
pub struct HandshakeConfig {
    /// How long a joining peer has to acknowledge before it is marked
    /// timed out
    pub timeout: Duration,
    /// Protocol version tokens treated as compatible
    pub accepted_versions: Vec<String>,
}

impl HandshakeConfig {
    pub fn accepts(&self, version: &str) -> bool {
        self.accepted_versions.iter().any(|accepted| accepted == version)
    }
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            accepted_versions: vec![PROTOCOL_VERSION.to_string()],
        }
    }
}
