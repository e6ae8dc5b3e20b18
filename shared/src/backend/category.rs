use std::fmt;

/// The fixed set of storage kinds the aggregator understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendCategory {
    /// Placed storage blocks: chests, crates, safes
    Container,
    /// Vehicle storage bags
    Vehicle,
    /// Drone cargo bays
    Drone,
    /// Water collector buffers
    DewCollector,
    /// Workstation output slots (forges, campfires, chem stations)
    Workstation,
}

impl BackendCategory {
    pub const ALL: [BackendCategory; 5] = [
        BackendCategory::Container,
        BackendCategory::Vehicle,
        BackendCategory::Drone,
        BackendCategory::DewCollector,
        BackendCategory::Workstation,
    ];

    /// Order used for categories that configuration never mentions
    pub const DEFAULT_ORDER: [BackendCategory; 5] = [
        BackendCategory::Drone,
        BackendCategory::DewCollector,
        BackendCategory::Workstation,
        BackendCategory::Container,
        BackendCategory::Vehicle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackendCategory::Container => "Container",
            BackendCategory::Vehicle => "Vehicle",
            BackendCategory::Drone => "Drone",
            BackendCategory::DewCollector => "DewCollector",
            BackendCategory::Workstation => "Workstation",
        }
    }
}

impl fmt::Display for BackendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who can see a backend's contents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendScope {
    /// Storage owned by the local participant alone (its own vehicle or drone)
    Local,
    /// World storage other participants can also read and modify
    Shared,
}
