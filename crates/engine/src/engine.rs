//! The discovery engine - owns all progression state and routes events.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use waypoint_core::{CaseStudyId, ProgressionState, Region, RegionId, RevealPhase, Signal, SignalKind};
use waypoint_progress::{
    breakdown, ExplorationBreakdown, IntersectionEntry, ProgressionStore, VisibilityTracker,
};
use waypoint_storage::Storage;
use crate::bus::{SignalBus, Subscription};
use crate::config::EngineConfig;
use crate::reveal::RevealMachine;
use crate::timer::{TimerHandle, TimerKind, TimerToken, Timers};
use crate::EngineError;

/// Messages the host (and the engine's own timers) send to the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// One intersection-observer callback batch
    Intersections(Vec<IntersectionEntry>),
    /// Loading screen started
    PageLoadStarted,
    /// Page content is now visible to the visitor
    ContentVisible,
    /// Visitor used the manual reveal control
    RevealTriggered,
    /// Visitor closed the hint popup
    HintDismissed,
    /// Visitor closed the discovered popup
    DiscoveredDismissed,
    /// Transition overlay finished animating
    TransitionOverlayComplete,
    /// A scheduled timer elapsed
    TimerFired {
        /// Token of the elapsed timer
        token: TimerToken,
    },
    /// Stop the run loop
    Shutdown,
}

/// What presentation needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryView {
    /// Exploration percentage, 0..=100
    pub exploration_percentage: u8,
    /// Whether the hidden reality has been discovered on this device
    pub reality_discovered: bool,
    /// Reveal sequence phase
    pub phase: RevealPhase,
    /// Loading screen visible
    pub loading: bool,
    /// Hint popup visible
    pub hint_visible: bool,
    /// Transition overlay visible
    pub transition_visible: bool,
    /// Discovered popup visible
    pub discovered_visible: bool,
}

/// Cloneable sender side of the engine inbox.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    /// Send a raw event.
    pub fn send(&self, event: EngineEvent) -> Result<(), EngineError> {
        self.tx.send(event).map_err(|_| EngineError::Closed)
    }

    /// Forward an intersection batch.
    pub fn intersections(&self, batch: Vec<IntersectionEntry>) -> Result<(), EngineError> {
        self.send(EngineEvent::Intersections(batch))
    }

    /// Report that the loading screen started.
    pub fn page_load_started(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::PageLoadStarted)
    }

    /// Report that content is visible.
    pub fn content_visible(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::ContentVisible)
    }

    /// Manual reveal trigger.
    pub fn trigger_reveal(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::RevealTriggered)
    }

    /// Hint popup dismiss handler.
    pub fn dismiss_hint(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::HintDismissed)
    }

    /// Discovered popup dismiss handler.
    pub fn dismiss_discovered(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::DiscoveredDismissed)
    }

    /// Transition overlay completion callback.
    pub fn transition_overlay_complete(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::TransitionOverlayComplete)
    }

    /// Stop the run loop.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.send(EngineEvent::Shutdown)
    }
}

/// The discovery and progression engine for one page lifetime.
///
/// Owns the progression store, the visibility tracker, the reveal machine and
/// every pending timer. All mutation happens on whichever task drives
/// [`run`](Self::run) or [`pump`](Self::pump), so events are applied strictly
/// one at a time.
pub struct DiscoveryEngine<S: Storage> {
    config: EngineConfig,
    store: ProgressionStore<S>,
    tracker: VisibilityTracker,
    reveal: RevealMachine,
    timers: Timers,
    tx: mpsc::UnboundedSender<EngineEvent>,
    inbox: mpsc::UnboundedReceiver<EngineEvent>,
    subscription: Option<Subscription>,
    view_tx: watch::Sender<DiscoveryView>,
    loading: bool,
    content_timer: Option<TimerHandle>,
}

impl<S: Storage> DiscoveryEngine<S> {
    /// Rehydrate from `storage`, start observing every region and subscribe
    /// to completion signals on `bus`.
    pub async fn mount(storage: S, bus: &SignalBus, config: EngineConfig) -> Self {
        let store = ProgressionStore::open(storage).await;
        let tracker = VisibilityTracker::mount(Region::all(config.visibility_threshold));
        let reveal = RevealMachine::new(config.hint_delay(), config.transition_duration());
        let (tx, inbox) = mpsc::unbounded_channel();
        let subscription = bus.subscribe(SignalKind::CaseStudyComplete);

        let mut engine = Self {
            config,
            store,
            tracker,
            reveal,
            timers: Timers::new(tx.clone()),
            tx,
            inbox,
            subscription: Some(subscription),
            view_tx: watch::channel(DiscoveryView::initial()).0,
            loading: false,
            content_timer: None,
        };
        engine.publish_view();
        info!(
            percentage = engine.view().exploration_percentage,
            "discovery engine mounted"
        );
        engine
    }

    /// Handle for sending events from elsewhere.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle { tx: self.tx.clone() }
    }

    /// Receiver that sees a new view after every handled event.
    pub fn subscribe_view(&self) -> watch::Receiver<DiscoveryView> {
        self.view_tx.subscribe()
    }

    /// Current view.
    pub fn view(&self) -> DiscoveryView {
        DiscoveryView {
            exploration_percentage: self.breakdown().percentage,
            reality_discovered: self.store.state().reality_discovered(),
            phase: self.reveal.phase(),
            loading: self.loading,
            hint_visible: self.reveal.hint_visible(),
            transition_visible: self.reveal.transition_visible(),
            discovered_visible: self.reveal.discovered_visible(),
        }
    }

    /// Shares behind the current percentage.
    pub fn breakdown(&self) -> ExplorationBreakdown {
        breakdown(
            &self.config.weights,
            self.store.state(),
            RegionId::ALL.len(),
            CaseStudyId::ALL.len(),
        )
    }

    /// Current progression state.
    pub fn state(&self) -> &ProgressionState {
        self.store.state()
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one event. Returns `false` for [`EngineEvent::Shutdown`].
    pub async fn handle_event(&mut self, event: EngineEvent) -> bool {
        match event {
            EngineEvent::Intersections(batch) => {
                let viewed = self.tracker.process(&batch, self.store.state());
                for id in viewed {
                    self.store.mark_region_viewed(id).await;
                }
            }
            EngineEvent::PageLoadStarted => self.start_loading(),
            EngineEvent::ContentVisible => self.show_content(),
            EngineEvent::RevealTriggered => {
                self.reveal.trigger(&mut self.store, &mut self.timers).await;
            }
            EngineEvent::HintDismissed => {
                self.reveal.dismiss_hint(&mut self.store).await;
            }
            EngineEvent::DiscoveredDismissed => {
                self.reveal.dismiss_discovered();
            }
            EngineEvent::TransitionOverlayComplete => {
                self.reveal.overlay_complete();
            }
            EngineEvent::TimerFired { token } => self.timer_fired(token),
            EngineEvent::Shutdown => return false,
        }
        self.publish_view();
        true
    }

    /// Apply a bus signal.
    pub async fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::CaseStudyComplete { case_study_id } => match case_study_id.parse::<CaseStudyId>() {
                Ok(id) => {
                    self.store.mark_case_study_viewed(id).await;
                }
                Err(e) => warn!(error = %e, "ignoring completion signal"),
            },
        }
        self.publish_view();
    }

    /// Apply everything already queued, without waiting. Returns the number of
    /// events and signals handled. Stops early at [`EngineEvent::Shutdown`].
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if let Some(signal) = self.subscription.as_mut().and_then(Subscription::try_recv) {
                self.handle_signal(signal).await;
                handled += 1;
                continue;
            }
            match self.inbox.try_recv() {
                Ok(event) => {
                    handled += 1;
                    if !self.handle_event(event).await {
                        return handled;
                    }
                }
                Err(_) => return handled,
            }
        }
    }

    /// Process events and signals until [`EngineEvent::Shutdown`], then
    /// unmount and return the storage backend.
    pub async fn run(mut self) -> S {
        loop {
            tokio::select! {
                Some(event) = self.inbox.recv() => {
                    if !self.handle_event(event).await {
                        break;
                    }
                }
                signal = next_signal(&mut self.subscription) => match signal {
                    Some(signal) => self.handle_signal(signal).await,
                    None => {
                        debug!("signal bus closed");
                        self.subscription = None;
                    }
                },
            }
        }
        self.unmount()
    }

    /// Cancel all timers, stop observing regions, unsubscribe from the bus
    /// and return the storage backend.
    pub fn unmount(mut self) -> S {
        if let Some(timer) = self.content_timer.take() {
            timer.cancel();
        }
        self.reveal.shutdown();
        self.tracker.disconnect();
        self.subscription = None;
        info!("discovery engine unmounted");
        self.store.into_storage()
    }

    // === Convenience wrappers for hosts that drive the engine directly ===

    /// Forward an intersection batch.
    pub async fn record_intersections(&mut self, batch: Vec<IntersectionEntry>) {
        self.handle_event(EngineEvent::Intersections(batch)).await;
    }

    /// Start the loading screen sequence.
    pub async fn page_load_started(&mut self) {
        self.handle_event(EngineEvent::PageLoadStarted).await;
    }

    /// Report content visible.
    pub async fn content_visible(&mut self) {
        self.handle_event(EngineEvent::ContentVisible).await;
    }

    /// Manual reveal trigger.
    pub async fn trigger_reveal(&mut self) {
        self.handle_event(EngineEvent::RevealTriggered).await;
    }

    /// Close the hint popup.
    pub async fn dismiss_hint(&mut self) {
        self.handle_event(EngineEvent::HintDismissed).await;
    }

    /// Close the discovered popup.
    pub async fn dismiss_discovered(&mut self) {
        self.handle_event(EngineEvent::DiscoveredDismissed).await;
    }

    /// Transition overlay finished.
    pub async fn transition_overlay_complete(&mut self) {
        self.handle_event(EngineEvent::TransitionOverlayComplete).await;
    }

    fn start_loading(&mut self) {
        if self.loading || self.content_timer.is_some() {
            return;
        }
        self.loading = true;
        self.content_timer = Some(
            self.timers
                .schedule(TimerKind::ContentReveal, self.config.content_delay()),
        );
        debug!(delay = ?self.config.content_delay(), "loading screen shown");
    }

    fn show_content(&mut self) {
        if let Some(timer) = self.content_timer.take() {
            timer.cancel();
        }
        self.loading = false;
        let hint_shown = self.store.state().hint_already_shown_this_session();
        self.reveal.content_visible(hint_shown, &mut self.timers);
    }

    fn timer_fired(&mut self, token: TimerToken) {
        if self.content_timer.as_ref().map(TimerHandle::token) == Some(token) {
            self.content_timer = None;
            self.show_content();
            return;
        }
        self.reveal.timer_fired(token);
    }

    fn publish_view(&mut self) {
        let view = self.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

impl DiscoveryView {
    fn initial() -> Self {
        Self {
            exploration_percentage: 0,
            reality_discovered: false,
            phase: RevealPhase::Idle,
            loading: false,
            hint_visible: false,
            transition_visible: false,
            discovered_visible: false,
        }
    }
}

async fn next_signal(subscription: &mut Option<Subscription>) -> Option<Signal> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}
