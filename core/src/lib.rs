// Kontakt Bridge — beacon monitoring for webview-hosted hybrid apps
//
// The native SDK does the hard part: BLE scanning, region matching, signal
// processing. This crate owns only the event-delivery contract between that
// opaque subsystem and application code.

pub mod beacon;
pub mod bridge;
pub mod debug;
pub mod event;
mod router;
pub mod session;
pub mod settings;

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use beacon::{Beacon, Proximity, Region, KONTAKT_FACTORY_UUID};
pub use bridge::{
    ErrorHandler, PluginBridge, SuccessHandler, METHOD_START_MONITORING, METHOD_STOP_MONITORING,
    PLUGIN_IDENTIFIER,
};
pub use debug::{print_to_log, print_value};
pub use event::BeaconEvent;
pub use session::{EventSubscription, MonitoringSession};
pub use settings::{MonitorSettings, MonitorSettingsManager};

use router::EventRouter;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// A monitoring session is already active; the native layer supports one.
    #[error("Monitoring already active")]
    AlreadyMonitoring,
    /// No monitoring session is active.
    #[error("Not monitoring")]
    NotMonitoring,
    /// The session handle does not match the active session.
    #[error("Stale session handle")]
    StaleSession,
    /// Invalid input
    #[error("Invalid input")]
    InvalidInput,
    /// Storage error
    #[error("Storage error")]
    StorageError,
    /// Internal error
    #[error("Internal error")]
    Internal,
    /// The native layer reported a failure. Normally surfaced through
    /// `BeaconDelegate::on_error` rather than a `Result`.
    #[error("Native operation failed: {0}")]
    Native(String),
}

// ============================================================================
// BEACON DELEGATE TRAIT
// ============================================================================

/// Callback interface for beacon events (implemented by the embedding app).
///
/// Every method has a no-op default: a handler the app does not care about
/// simply never fires, and the corresponding events are dropped without
/// error. Callbacks run synchronously inside the bridge's own delivery
/// context, in arrival order, so implementations should return quickly.
pub trait BeaconDelegate: Send + Sync {
    /// A ranging tick completed; all matching beacons currently in range.
    fn on_beacons_ranged(&self, _beacons: Vec<Beacon>) {}
    /// Entered proximity of a monitored region.
    fn on_region_entered(&self, _region: Region) {}
    /// Left proximity of a monitored region.
    fn on_region_exited(&self, _region: Region) {}
    /// The native layer acknowledged a stop request. No payload.
    fn on_monitoring_stopped(&self) {}
    /// The native layer reported a failure, forwarded verbatim.
    fn on_error(&self, _message: String) {}
}

// ============================================================================
// BEACON MONITOR
// ============================================================================

/// Entry point for beacon monitoring over a plugin bridge.
///
/// Holds the bridge handle, the event router, and the single active-session
/// slot (the native layer tracks exactly one monitoring session per process).
/// All operations return immediately; results and events arrive later through
/// the delegate and any subscription streams, on whatever thread the bridge
/// delivers callbacks.
#[derive(Clone)]
pub struct BeaconMonitor {
    bridge: Arc<dyn PluginBridge>,
    router: Arc<EventRouter>,
    active: Arc<Mutex<Option<Uuid>>>,
    settings: MonitorSettings,
}

impl BeaconMonitor {
    /// Create a monitor over the given bridge with default settings.
    pub fn new(bridge: Arc<dyn PluginBridge>) -> Self {
        Self::with_settings(bridge, MonitorSettings::default())
    }

    /// Create a monitor with explicit settings.
    pub fn with_settings(bridge: Arc<dyn PluginBridge>, settings: MonitorSettings) -> Self {
        // Initialize tracing (idempotent)
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .try_init();

        let router = Arc::new(EventRouter::new(
            settings.event_buffer_capacity,
            settings.log_unknown_events,
        ));

        Self {
            bridge,
            router,
            active: Arc::new(Mutex::new(None)),
            settings,
        }
    }

    // ------------------------------------------------------------------------
    // LIFECYCLE
    // ------------------------------------------------------------------------

    /// Start monitoring the given regions.
    ///
    /// Issues exactly one bridge invocation registering a long-lived success
    /// handler; the handler feeds the router for the lifetime of the session.
    /// Returns the session handle synchronously: "request issued", not
    /// "monitoring running". If the native layer cannot start (permissions,
    /// hardware, malformed region), `on_error` fires later and the session
    /// slot clears.
    ///
    /// An empty [`Region`] in `regions` matches every beacon under the
    /// factory UUID; see [`Region::all`].
    pub fn start_monitoring(
        &self,
        regions: &[Region],
    ) -> Result<MonitoringSession, BridgeError> {
        let session = MonitoringSession::new(regions.to_vec());
        {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(BridgeError::AlreadyMonitoring);
            }
            *active = Some(session.id());
        }

        let args = vec![serde_json::to_value(regions).map_err(|_| BridgeError::InvalidInput)?];

        let router = self.router.clone();
        let on_success: SuccessHandler = Arc::new(move |envelope| router.handle_envelope(envelope));

        // An error delivery on the paired channel ends the session
        let router_err = self.router.clone();
        let active_slot = self.active.clone();
        let session_id = session.id();
        let on_error: ErrorHandler = Arc::new(move |message| {
            let mut active = active_slot.lock();
            if *active == Some(session_id) {
                *active = None;
            }
            drop(active);
            router_err.handle_error(message);
        });

        self.bridge.invoke(
            PLUGIN_IDENTIFIER,
            METHOD_START_MONITORING,
            args,
            on_success,
            on_error,
        );

        tracing::info!(
            session = %session.id(),
            regions = regions.len(),
            "Beacon monitoring requested"
        );
        Ok(session)
    }

    /// Stop the active monitoring session.
    ///
    /// Consumes the handle, so a stop can only be issued once per session.
    /// Issues one bridge invocation and returns synchronously; on native
    /// acknowledgment `on_monitoring_stopped` fires and the session slot
    /// clears. Events already in flight when stop is requested may still be
    /// delivered; the race lives in the bridge, not here.
    pub fn stop_monitoring(&self, session: MonitoringSession) -> Result<(), BridgeError> {
        {
            let active = self.active.lock();
            match *active {
                None => return Err(BridgeError::NotMonitoring),
                Some(id) if id != session.id() => return Err(BridgeError::StaleSession),
                Some(_) => {}
            }
        }

        let session_id = session.id();

        let router = self.router.clone();
        let active_slot = self.active.clone();
        let on_success: SuccessHandler = Arc::new(move |_ack| {
            let mut active = active_slot.lock();
            if *active == Some(session_id) {
                *active = None;
            }
            drop(active);
            router.notify_stopped();
        });

        // A failed stop leaves native state unknown; release the slot either
        // way so the app can attempt a fresh session.
        let router_err = self.router.clone();
        let active_slot = self.active.clone();
        let on_error: ErrorHandler = Arc::new(move |message| {
            let mut active = active_slot.lock();
            if *active == Some(session_id) {
                *active = None;
            }
            drop(active);
            router_err.handle_error(message);
        });

        self.bridge.invoke(
            PLUGIN_IDENTIFIER,
            METHOD_STOP_MONITORING,
            Vec::new(),
            on_success,
            on_error,
        );

        tracing::info!(session = %session_id, "Beacon monitoring stop requested");
        Ok(())
    }

    /// True while a session handle is outstanding and not yet stopped or
    /// failed. Reflects the request state, not the native scanner state.
    pub fn is_monitoring(&self) -> bool {
        self.active.lock().is_some()
    }

    // ------------------------------------------------------------------------
    // DELIVERY
    // ------------------------------------------------------------------------

    /// Install or clear the delegate receiving typed callbacks.
    pub fn set_delegate(&self, delegate: Option<Box<dyn BeaconDelegate>>) {
        self.router.set_delegate(delegate);
    }

    /// Open a cancellable stream of [`BeaconEvent`]s.
    ///
    /// Subscriptions are independent of the delegate and of each other; each
    /// receives every event in arrival order, bounded by its own buffer.
    pub fn subscribe(&self) -> EventSubscription {
        self.router.subscribe()
    }

    /// The settings this monitor was built with.
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// Bridge double: records invocations, hands back the registered
    /// callback pair so tests can play the native side.
    #[derive(Default)]
    struct FakeBridge {
        calls: Mutex<Vec<(String, String, Vec<Value>)>>,
        last_success: Mutex<Option<SuccessHandler>>,
        last_error: Mutex<Option<ErrorHandler>>,
    }

    impl FakeBridge {
        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn deliver_success(&self, payload: Value) {
            let handler = self.last_success.lock().clone().expect("no success handler");
            handler(payload);
        }

        fn deliver_error(&self, message: &str) {
            let handler = self.last_error.lock().clone().expect("no error handler");
            handler(message.to_string());
        }
    }

    impl PluginBridge for FakeBridge {
        fn invoke(
            &self,
            plugin: &str,
            method: &str,
            args: Vec<Value>,
            on_success: SuccessHandler,
            on_error: ErrorHandler,
        ) {
            self.calls
                .lock()
                .push((plugin.to_string(), method.to_string(), args));
            *self.last_success.lock() = Some(on_success);
            *self.last_error.lock() = Some(on_error);
        }
    }

    fn make_monitor() -> (BeaconMonitor, Arc<FakeBridge>) {
        let bridge = Arc::new(FakeBridge::default());
        let monitor = BeaconMonitor::new(bridge.clone());
        (monitor, bridge)
    }

    #[test]
    fn test_monitor_starts_idle() {
        let (monitor, bridge) = make_monitor();
        assert!(!monitor.is_monitoring());
        assert_eq!(bridge.call_count(), 0);
    }

    #[test]
    fn test_start_issues_one_call_and_marks_active() {
        let (monitor, bridge) = make_monitor();

        let session = monitor.start_monitoring(&[Region::all()]).unwrap();
        assert!(monitor.is_monitoring());
        assert_eq!(bridge.call_count(), 1);
        assert_eq!(session.regions(), &[Region::all()]);

        let calls = bridge.calls.lock();
        let (plugin, method, args) = &calls[0];
        assert_eq!(plugin, PLUGIN_IDENTIFIER);
        assert_eq!(method, METHOD_START_MONITORING);
        assert_eq!(args.as_slice(), [serde_json::json!([{}])]);
    }

    #[test]
    fn test_double_start_is_rejected_locally() {
        let (monitor, bridge) = make_monitor();

        let _session = monitor.start_monitoring(&[Region::all()]).unwrap();
        let second = monitor.start_monitoring(&[Region::all()]);
        assert_eq!(second.unwrap_err(), BridgeError::AlreadyMonitoring);
        // Only the first request reached the bridge
        assert_eq!(bridge.call_count(), 1);
    }

    #[test]
    fn test_native_error_releases_session_slot() {
        let (monitor, bridge) = make_monitor();

        let session = monitor.start_monitoring(&[Region::all()]).unwrap();
        assert!(monitor.is_monitoring());

        bridge.deliver_error("bluetooth unavailable");
        assert!(!monitor.is_monitoring());

        // The handle is now stale; stopping with it cannot reach the bridge
        assert_eq!(
            monitor.stop_monitoring(session).unwrap_err(),
            BridgeError::NotMonitoring
        );
        assert_eq!(bridge.call_count(), 1);
    }

    #[test]
    fn test_stale_handle_rejected_after_restart() {
        let (monitor, bridge) = make_monitor();

        let first = monitor.start_monitoring(&[Region::all()]).unwrap();
        bridge.deliver_error("permission denied");

        let _second = monitor.start_monitoring(&[Region::all()]).unwrap();
        assert_eq!(
            monitor.stop_monitoring(first).unwrap_err(),
            BridgeError::StaleSession
        );
    }

    #[test]
    fn test_stop_clears_active_on_acknowledgment() {
        let (monitor, bridge) = make_monitor();

        let session = monitor.start_monitoring(&[Region::all()]).unwrap();
        monitor.stop_monitoring(session).unwrap();
        assert_eq!(bridge.call_count(), 2);

        // Still active until the native side acknowledges
        assert!(monitor.is_monitoring());
        bridge.deliver_success(Value::Null);
        assert!(!monitor.is_monitoring());
    }

    #[test]
    fn test_stop_without_session_is_rejected() {
        let (monitor, bridge) = make_monitor();
        let other_monitor = BeaconMonitor::new(bridge.clone());
        let foreign = other_monitor.start_monitoring(&[Region::all()]).unwrap();

        assert_eq!(
            monitor.stop_monitoring(foreign).unwrap_err(),
            BridgeError::NotMonitoring
        );
    }
}
