//! Completion signal bus.
//!
//! Publishers and subscribers share only a [`SignalBus`] handle; neither holds
//! a reference to the other. Each subscription owns an unbounded queue, so a
//! publish never blocks and never drops a signal for a live subscriber.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;
use tracing::{debug, trace};
use waypoint_core::{Signal, SignalKind};

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: HashMap<u64, (SignalKind, mpsc::UnboundedSender<Signal>)>,
}

/// Publish/subscribe channel for cross-page signals.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Arc<Mutex<BusInner>>,
}

impl SignalBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `signal` to every subscriber of its kind. Returns how many
    /// subscribers received it; zero is not an error.
    pub fn publish(&self, signal: Signal) -> usize {
        let kind = signal.kind();
        let mut inner = lock(&self.inner);
        let mut delivered = 0;
        inner.subscribers.retain(|_, (sub_kind, tx)| {
            if *sub_kind != kind {
                return true;
            }
            match tx.send(signal.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        debug!(event = kind.name(), delivered, "signal published");
        delivered
    }

    /// Subscribe to one kind of signal. Dropping the subscription unsubscribes.
    pub fn subscribe(&self, kind: SignalKind) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, (kind, tx));
        trace!(event = kind.name(), id, "subscribed");
        Subscription {
            id,
            kind,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

/// Receiving end of a bus subscription.
pub struct Subscription {
    id: u64,
    kind: SignalKind,
    rx: mpsc::UnboundedReceiver<Signal>,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    /// Kind this subscription receives.
    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Wait for the next signal. `None` once the bus is gone and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }

    /// Next queued signal, without waiting.
    pub fn try_recv(&mut self) -> Option<Signal> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            lock(&inner).subscribers.remove(&self.id);
            trace!(event = self.kind.name(), id = self.id, "unsubscribed");
        }
    }
}

// Poisoning only means another holder panicked mid-update of a plain map.
fn lock(inner: &Mutex<BusInner>) -> MutexGuard<'_, BusInner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}
