//! Reveal phase - where the hidden-reality sequence currently stands.

use serde::{Deserialize, Serialize};

/// Phase of the hint → transition → discovered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RevealPhase {
    /// No popups, no hint timer armed
    #[default]
    Idle,
    /// Hint timer armed, popup not yet visible
    HintPending,
    /// Hint popup visible
    HintShown,
    /// Full-screen transition playing
    TransitionPlaying,
    /// Hidden reality revealed for this page load
    Discovered,
}

impl RevealPhase {
    /// Whether the manual reveal trigger still has an effect.
    pub fn accepts_trigger(&self) -> bool {
        matches!(
            self,
            RevealPhase::Idle | RevealPhase::HintPending | RevealPhase::HintShown
        )
    }

    /// Whether the reveal has started on this page load.
    pub fn is_revealing(&self) -> bool {
        matches!(self, RevealPhase::TransitionPlaying | RevealPhase::Discovered)
    }
}

impl std::fmt::Display for RevealPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevealPhase::Idle => write!(f, "idle"),
            RevealPhase::HintPending => write!(f, "hint-pending"),
            RevealPhase::HintShown => write!(f, "hint-shown"),
            RevealPhase::TransitionPlaying => write!(f, "transition-playing"),
            RevealPhase::Discovered => write!(f, "discovered"),
        }
    }
}
