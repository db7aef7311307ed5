//! Cancellable one-shot timers.
//!
//! A timer is a spawned task that sleeps and then posts
//! [`EngineEvent::TimerFired`] to the engine inbox. Dropping or cancelling the
//! [`TimerHandle`] aborts the task. A message that was already queued when the
//! handle was cancelled is still delivered, so receivers compare tokens
//! against the handle they hold before acting.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;
use crate::EngineEvent;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Loading screen finished, reveal page content
    ContentReveal,
    /// Show the hidden-reality hint
    Hint,
    /// Reality transition finished
    Transition,
}

/// Owned handle to a pending timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    token: TimerToken,
    kind: TimerKind,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Token the timer will fire with.
    pub fn token(&self) -> TimerToken {
        self.token
    }

    /// Purpose of the timer.
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Cancel the timer.
    pub fn cancel(self) {
        trace!(kind = ?self.kind, "timer cancelled");
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Schedules timers that report back to one inbox.
#[derive(Debug)]
pub struct Timers {
    inbox: mpsc::UnboundedSender<EngineEvent>,
    next: u64,
}

impl Timers {
    /// Create a scheduler posting to `inbox`.
    pub fn new(inbox: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { inbox, next: 0 }
    }

    /// Start a timer. Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerHandle {
        let token = TimerToken(self.next);
        self.next += 1;
        let inbox = self.inbox.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The engine may already be gone.
            let _ = inbox.send(EngineEvent::TimerFired { token });
        });
        trace!(?kind, ?delay, "timer scheduled");
        TimerHandle { token, kind, task }
    }
}
