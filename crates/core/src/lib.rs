//! Waypoint core data models.
//!
//! This crate defines the identifiers, progression state and reveal phases
//! shared by the storage, progress and engine crates.

#![warn(missing_docs)]

// Identities
mod id;

// Page model
mod region;

// Discovery state
mod state;
mod phase;

// Cross-page signals
mod signal;

pub mod keys;

// Re-exports
pub use id::*;
pub use region::{Region, DEFAULT_VISIBILITY_THRESHOLD};
pub use state::ProgressionState;
pub use phase::RevealPhase;
pub use signal::{Signal, SignalKind};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
