//! Discovery engine
//!
//! Ties the progression store, visibility tracker, completion signal bus and
//! reveal state machine into one owned engine driven by host events.

#![warn(missing_docs)]

pub mod bus;
pub mod timer;
pub mod reveal;
pub mod config;
pub mod engine;

pub use bus::{SignalBus, Subscription};
pub use timer::{TimerHandle, TimerKind, TimerToken, Timers};
pub use reveal::RevealMachine;
pub use config::EngineConfig;
pub use engine::{DiscoveryEngine, DiscoveryView, EngineEvent, EngineHandle};

/// Errors surfaced by the engine crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine has shut down and no longer accepts events
    #[error("engine inbox closed")]
    Closed,

    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`EngineConfig`]
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
