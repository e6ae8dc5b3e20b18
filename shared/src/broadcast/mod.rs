pub mod broadcast_config;
pub mod error;
pub mod lock_broadcaster;
pub mod lock_transport;
