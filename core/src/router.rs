// Event router — decodes envelopes and fans them out to delegate + streams

use crate::event::BeaconEvent;
use crate::session::EventSubscription;
use crate::BeaconDelegate;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Routes every envelope arriving on the bridge success channel.
///
/// One router lives for the lifetime of its monitor and survives across
/// monitoring sessions; the per-session piece is only the success handler
/// registration feeding it. Dispatch runs synchronously inside whatever
/// callback context the bridge delivers on; the router never reorders,
/// batches or buffers beyond each subscriber's own channel.
pub(crate) struct EventRouter {
    /// Platform delegate for typed callbacks.
    delegate: RwLock<Option<Arc<dyn BeaconDelegate>>>,
    /// Live subscription senders, keyed by subscriber id.
    subscribers: Mutex<HashMap<u64, mpsc::Sender<BeaconEvent>>>,
    next_subscriber_id: AtomicU64,
    /// Per-subscriber channel capacity.
    buffer_capacity: usize,
    /// Whether dropped unrecognized envelopes leave a log line.
    log_unknown_events: bool,
}

impl EventRouter {
    pub(crate) fn new(buffer_capacity: usize, log_unknown_events: bool) -> Self {
        Self {
            delegate: RwLock::new(None),
            subscribers: Mutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
            buffer_capacity,
            log_unknown_events,
        }
    }

    pub(crate) fn set_delegate(&self, delegate: Option<Box<dyn BeaconDelegate>>) {
        *self.delegate.write() = delegate.map(|d| Arc::from(d) as Arc<dyn BeaconDelegate>);
    }

    /// Register a new subscription stream.
    pub(crate) fn subscribe(self: &Arc<Self>) -> EventSubscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer_capacity);
        self.subscribers.lock().insert(id, tx);
        tracing::debug!(subscriber = id, "Subscription opened");
        EventSubscription::new(id, rx, Arc::clone(self))
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        if self.subscribers.lock().remove(&id).is_some() {
            tracing::debug!(subscriber = id, "Subscription closed");
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Entry point for the long-lived success handler.
    pub(crate) fn handle_envelope(&self, envelope: Value) {
        match BeaconEvent::decode(envelope) {
            Ok(event) => self.dispatch(event),
            Err(err) => {
                // Unrecognized discriminants are dropped, not errors: the
                // native side is allowed to grow new event kinds before this
                // layer learns about them.
                if self.log_unknown_events {
                    tracing::debug!("Dropping undecodable envelope: {err}");
                }
            }
        }
    }

    /// Deliver one decoded event, delegate first, then every live stream,
    /// in arrival order.
    pub(crate) fn dispatch(&self, event: BeaconEvent) {
        if let Some(delegate) = self.delegate.read().as_ref() {
            match &event {
                BeaconEvent::RangedBeacons { beacons } => {
                    delegate.on_beacons_ranged(beacons.clone())
                }
                BeaconEvent::EnteredRegion { region } => {
                    delegate.on_region_entered(region.clone())
                }
                BeaconEvent::ExitedRegion { region } => delegate.on_region_exited(region.clone()),
            }
        }
        self.broadcast(event);
    }

    fn broadcast(&self, event: BeaconEvent) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.is_empty() {
            return;
        }
        let mut closed = Vec::new();
        for (id, tx) in subscribers.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    // Lossy by contract: a slow consumer loses its own copy,
                    // nobody else's.
                    tracing::warn!(subscriber = id, "Subscription buffer full, event dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }
        for id in closed {
            subscribers.remove(&id);
        }
    }

    /// Forward a native failure verbatim.
    pub(crate) fn handle_error(&self, message: String) {
        tracing::warn!("Native beacon operation failed: {}", message);
        if let Some(delegate) = self.delegate.read().as_ref() {
            delegate.on_error(message);
        }
    }

    /// Native acknowledged a stop request.
    pub(crate) fn notify_stopped(&self) {
        tracing::info!("Beacon monitoring stopped");
        if let Some(delegate) = self.delegate.read().as_ref() {
            delegate.on_monitoring_stopped();
        }
    }
}
