//! Reveal state machine for the hidden reality.
//!
//! ```text
//! Idle ──content visible──▶ HintPending ──hint timer──▶ HintShown
//!  ▲                                                       │
//!  └──────────────────────── hint dismissed ───────────────┘
//!
//! Idle | HintPending | HintShown ──trigger──▶ TransitionPlaying ──transition timer──▶ Discovered
//! ```
//!
//! Each pending timer lives in the machine as a [`TimerHandle`]. Any
//! transition that supersedes a timer cancels it first, and a fire whose token
//! does not match the held handle is discarded.

use std::time::Duration;
use tracing::{debug, info};
use waypoint_core::RevealPhase;
use waypoint_progress::ProgressionStore;
use waypoint_storage::Storage;
use crate::timer::{TimerHandle, TimerKind, TimerToken, Timers};

/// Drives the hint → transition → discovered sequence.
#[derive(Debug)]
pub struct RevealMachine {
    phase: RevealPhase,
    hint_delay: Duration,
    transition_duration: Duration,
    hint_timer: Option<TimerHandle>,
    transition_timer: Option<TimerHandle>,
    hint_visible: bool,
    transition_visible: bool,
    discovered_visible: bool,
}

impl RevealMachine {
    /// Create an idle machine.
    pub fn new(hint_delay: Duration, transition_duration: Duration) -> Self {
        Self {
            phase: RevealPhase::Idle,
            hint_delay,
            transition_duration,
            hint_timer: None,
            transition_timer: None,
            hint_visible: false,
            transition_visible: false,
            discovered_visible: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Whether the hint popup is visible.
    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// Whether the transition overlay is visible.
    pub fn transition_visible(&self) -> bool {
        self.transition_visible
    }

    /// Whether the discovered popup is visible.
    pub fn discovered_visible(&self) -> bool {
        self.discovered_visible
    }

    /// Page content became visible. Arms the hint timer unless the hint was
    /// already dismissed this session. Returns whether a timer was armed.
    pub fn content_visible(&mut self, hint_already_shown: bool, timers: &mut Timers) -> bool {
        if hint_already_shown {
            debug!("hint already shown this session, not arming");
            return false;
        }
        if self.phase != RevealPhase::Idle {
            return false;
        }
        self.hint_timer = Some(timers.schedule(TimerKind::Hint, self.hint_delay));
        self.phase = RevealPhase::HintPending;
        debug!(delay = ?self.hint_delay, "hint timer armed");
        true
    }

    /// A timer fired. Returns whether it was current and caused a transition.
    pub fn timer_fired(&mut self, token: TimerToken) -> bool {
        if take_if_current(&mut self.hint_timer, token) {
            if self.phase != RevealPhase::HintPending {
                return false;
            }
            self.phase = RevealPhase::HintShown;
            self.hint_visible = true;
            info!("hint shown");
            return true;
        }
        if take_if_current(&mut self.transition_timer, token) {
            if self.phase != RevealPhase::TransitionPlaying {
                return false;
            }
            self.phase = RevealPhase::Discovered;
            self.discovered_visible = true;
            info!("discovered popup shown");
            return true;
        }
        debug!(?token, phase = %self.phase, "stale timer ignored");
        false
    }

    /// Visitor closed the hint. Records the dismissal for the rest of the
    /// session and returns to idle.
    pub async fn dismiss_hint<S: Storage>(&mut self, store: &mut ProgressionStore<S>) -> bool {
        if self.phase != RevealPhase::HintShown {
            return false;
        }
        self.hint_visible = false;
        store.mark_hint_shown().await;
        self.phase = RevealPhase::Idle;
        debug!("hint dismissed");
        true
    }

    /// Manual reveal. Cancels any pending hint, marks the reality discovered
    /// immediately and starts the transition. No-op once the transition has
    /// started.
    pub async fn trigger<S: Storage>(
        &mut self,
        store: &mut ProgressionStore<S>,
        timers: &mut Timers,
    ) -> bool {
        if !self.phase.accepts_trigger() {
            debug!(phase = %self.phase, "reveal already triggered");
            return false;
        }
        if let Some(timer) = self.hint_timer.take() {
            timer.cancel();
        }
        self.hint_visible = false;
        self.phase = RevealPhase::TransitionPlaying;
        self.transition_visible = true;
        store.mark_reality_discovered().await;
        self.transition_timer = Some(timers.schedule(TimerKind::Transition, self.transition_duration));
        info!("reality transition started");
        true
    }

    /// Transition collaborator finished its animation.
    pub fn overlay_complete(&mut self) -> bool {
        std::mem::replace(&mut self.transition_visible, false)
    }

    /// Visitor closed the discovered popup. The phase stays `Discovered`.
    pub fn dismiss_discovered(&mut self) -> bool {
        std::mem::replace(&mut self.discovered_visible, false)
    }

    /// Cancel every pending timer.
    pub fn shutdown(&mut self) {
        if let Some(timer) = self.hint_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.transition_timer.take() {
            timer.cancel();
        }
    }
}

fn take_if_current(slot: &mut Option<TimerHandle>, token: TimerToken) -> bool {
    if slot.as_ref().map(TimerHandle::token) == Some(token) {
        *slot = None;
        true
    } else {
        false
    }
}
