//! Visibility tracking for page regions.
//!
//! The host owns the actual intersection primitive and forwards each callback
//! batch here. The tracker turns batches into at-most-once "region viewed"
//! events.

use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use waypoint_core::{ProgressionState, Region, RegionId};

/// One entry of an intersection-observer callback batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    /// Element id of the observed target
    pub target: String,
    /// Fraction of the target's area inside the viewport
    pub ratio: f64,
    /// Whether the target intersects the viewport at all
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Entry for a target that is `ratio` visible.
    pub fn new(target: impl Into<String>, ratio: f64) -> Self {
        Self {
            target: target.into(),
            ratio,
            is_intersecting: ratio > 0.0,
        }
    }
}

/// Tracks which regions have crossed their visibility threshold.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    regions: HashMap<RegionId, Region>,
    reported: HashSet<RegionId>,
    connected: bool,
}

impl VisibilityTracker {
    /// Create a tracker observing nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker observing `regions`.
    pub fn mount(regions: impl IntoIterator<Item = Region>) -> Self {
        let mut tracker = Self::new();
        for region in regions {
            tracker.observe(region);
        }
        tracker
    }

    /// Start observing a region. Re-observing replaces its threshold.
    pub fn observe(&mut self, region: Region) {
        self.regions.insert(region.id, region);
        self.connected = true;
    }

    /// Stop observing everything. Later batches are ignored.
    pub fn disconnect(&mut self) {
        self.regions.clear();
        self.connected = false;
    }

    /// Whether any region is being observed.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of observed regions.
    pub fn observed(&self) -> usize {
        self.regions.len()
    }

    /// Process one callback batch, returning regions viewed for the first time.
    ///
    /// Regions already present in `state` are never reported, and no region is
    /// reported twice by the same tracker.
    pub fn process(&mut self, batch: &[IntersectionEntry], state: &ProgressionState) -> Vec<RegionId> {
        if !self.connected {
            trace!(entries = batch.len(), "batch after disconnect ignored");
            return Vec::new();
        }

        let mut viewed = Vec::new();
        for entry in batch {
            let Ok(id) = entry.target.parse::<RegionId>() else {
                trace!(element = %entry.target, "unobserved target");
                continue;
            };
            let Some(region) = self.regions.get(&id) else {
                continue;
            };
            if !entry.is_intersecting || !region.is_satisfied_by(entry.ratio) {
                continue;
            }
            if state.has_viewed_region(id) || !self.reported.insert(id) {
                continue;
            }
            debug!(region = %id, ratio = entry.ratio, "region crossed visibility threshold");
            viewed.push(id);
        }
        viewed
    }
}
