pub mod error;
pub mod gate;
pub mod handshake_config;
pub mod lock_report;
pub mod peer_trust_record;
pub mod trust_handshake;
