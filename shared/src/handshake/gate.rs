use std::fmt;

/// Whether aggregation may reach beyond the local participant's own storage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateState {
    /// Some connected peer has not proven it runs compatible aggregation;
    /// only local storage is used
    Locked,
    /// Every connected peer is verified
    Unlocked,
}

impl GateState {
    pub fn is_locked(&self) -> bool {
        *self == GateState::Locked
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Locked => f.write_str("Locked"),
            GateState::Unlocked => f.write_str("Unlocked"),
        }
    }
}

/// One flip of the gate. `epoch` grows by one with every flip, so a
/// transition computed earlier always carries a smaller epoch than one
/// computed later, whichever reaches the broadcaster first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateTransition {
    pub gate: GateState,
    pub epoch: u64,
}

impl GateTransition {
    pub fn new(gate: GateState, epoch: u64) -> Self {
        Self { gate, epoch }
    }
}

/// Read access to the aggregate gate
pub trait GateSource: Send + Sync {
    fn gate_state(&self) -> GateState;
}

/// A gate that never changes; single-player hosts use `Unlocked`
pub struct FixedGate(pub GateState);

impl GateSource for FixedGate {
    fn gate_state(&self) -> GateState {
        self.0
    }
}
