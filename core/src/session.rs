// Session handle and subscription stream — caller-owned cancellation tokens

use crate::beacon::Region;
use crate::event::BeaconEvent;
use crate::router::EventRouter;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle to an active monitoring session.
///
/// Returned synchronously from `BeaconMonitor::start_monitoring` as the
/// acknowledgment that the request was issued (not that native monitoring
/// succeeded; failures arrive through `BeaconDelegate::on_error`). The
/// handle is deliberately not `Clone`: passing it to `stop_monitoring`
/// consumes it, so a stop request can only ever be issued once per session.
#[derive(Debug)]
pub struct MonitoringSession {
    id: Uuid,
    regions: Vec<Region>,
}

impl MonitoringSession {
    pub(crate) fn new(regions: Vec<Region>) -> Self {
        Self {
            id: Uuid::new_v4(),
            regions,
        }
    }

    /// Token identifying this session to its monitor.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The regions this session was started with.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

/// A cancellable stream of [`BeaconEvent`]s.
///
/// Events are delivered in arrival order. Each subscription owns a bounded
/// buffer; when it fills, further events are dropped for this subscriber
/// only, as there is no buffering guarantee beyond what the bridge itself
/// provides. Dropping the subscription (or calling [`unsubscribe`]) detaches
/// it from the router immediately.
///
/// [`unsubscribe`]: EventSubscription::unsubscribe
pub struct EventSubscription {
    id: u64,
    rx: mpsc::Receiver<BeaconEvent>,
    router: Arc<EventRouter>,
}

impl EventSubscription {
    pub(crate) fn new(id: u64, rx: mpsc::Receiver<BeaconEvent>, router: Arc<EventRouter>) -> Self {
        Self { id, rx, router }
    }

    /// Await the next event. Returns `None` once the subscription has been
    /// detached and its buffer drained.
    pub async fn recv(&mut self) -> Option<BeaconEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll for a buffered event.
    pub fn try_next(&mut self) -> Option<BeaconEvent> {
        self.rx.try_recv().ok()
    }

    /// Detach from the router. Buffered events are discarded.
    pub fn unsubscribe(self) {
        // Drop does the actual work
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.router.unsubscribe(self.id);
    }
}

impl Stream for EventSubscription {
    type Item = BeaconEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<BeaconEvent>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
