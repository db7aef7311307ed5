//! Region model - a tracked page section and its visibility threshold.

use serde::{Deserialize, Serialize};
use crate::id::RegionId;

/// Fraction of a region's area that must be on-screen for it to count as viewed.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.8;

/// A region of the home page observed for visibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region identifier
    pub id: RegionId,

    /// Visible fraction required, in `0.0..=1.0`
    pub threshold: f64,
}

impl Region {
    /// Create a region with the default threshold.
    pub fn new(id: RegionId) -> Self {
        Self {
            id,
            threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }

    /// Override the threshold. Values outside `0.0..=1.0` are clamped.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// The full region set, each at `threshold`.
    pub fn all(threshold: f64) -> Vec<Region> {
        RegionId::ALL
            .into_iter()
            .map(|id| Region::new(id).with_threshold(threshold))
            .collect()
    }

    /// Whether an observed visible fraction satisfies this region.
    pub fn is_satisfied_by(&self, ratio: f64) -> bool {
        ratio >= self.threshold
    }
}
