use std::sync::Arc;

use crate::types::Position;

use super::backend::Backend;

/// How far from the reference point backends are collected
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScanRadius {
    Unlimited,
    Within(f32),
}

impl ScanRadius {
    /// Converts the configured range value; any negative value means
    /// unlimited range
    pub fn from_config(range: f32) -> Self {
        if range < 0.0 || range.is_nan() {
            ScanRadius::Unlimited
        } else {
            ScanRadius::Within(range)
        }
    }

    pub fn contains(&self, distance: f32) -> bool {
        match self {
            ScanRadius::Unlimited => true,
            ScanRadius::Within(radius) => distance <= *radius,
        }
    }
}

/// Supplies the candidate backends around a reference point.
///
/// Implemented by the host game: which world objects count as storage, and
/// how their slot arrays are reached, is its business. The provider keeps
/// ownership of the backends it returns; the core holds them only weakly, so
/// a backend dropped by the provider reads as unavailable.
pub trait ScanProvider: Send + Sync {
    fn enumerate_backends(&self, reference: &Position, radius: ScanRadius) -> Vec<Arc<dyn Backend>>;
}
