use crate::handshake::gate::GateState;

use super::error::TransportError;

/// Outbound channel for gate state, supplied by the host's networking layer
pub trait LockTransport: Send + Sync {
    fn send_gate_state(&self, state: GateState) -> Result<(), TransportError>;
}

/// Transport for hosts with no peers to tell
pub struct NoopTransport;

impl LockTransport for NoopTransport {
    fn send_gate_state(&self, _state: GateState) -> Result<(), TransportError> {
        Ok(())
    }
}
