//! Progress Tracking
//!
//! Discovery state with write-through persistence, the exploration
//! percentage, and region visibility tracking.

#![warn(missing_docs)]

pub mod store;
pub mod exploration;
pub mod visibility;

pub use store::ProgressionStore;
pub use exploration::{
    breakdown, compute_percentage, ExplorationBreakdown, ExplorationWeights, UNDISCOVERED_CAP,
};
pub use visibility::{IntersectionEntry, VisibilityTracker};
