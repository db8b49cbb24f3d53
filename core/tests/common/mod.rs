#![allow(dead_code)]
// Shared test doubles for the integration suites.

use kontakt_bridge_core::{
    Beacon, BeaconDelegate, ErrorHandler, PluginBridge, Region, SuccessHandler,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One invocation captured from the monitor, with the callback pair the
/// native side would have kept.
pub struct RecordedCall {
    pub plugin: String,
    pub method: String,
    pub args: Vec<Value>,
    pub on_success: SuccessHandler,
    pub on_error: ErrorHandler,
}

/// Bridge double standing in for the native plugin layer. Records every
/// invocation and lets the test fire the registered callbacks, which is
/// exactly how the real bridge delivers results: later, repeatedly for the
/// long-lived start handler, on a thread of its choosing.
#[derive(Default)]
pub struct RecordingBridge {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn method_of(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index].method.clone()
    }

    pub fn plugin_of(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index].plugin.clone()
    }

    pub fn args_of(&self, index: usize) -> Vec<Value> {
        self.calls.lock().unwrap()[index].args.clone()
    }

    /// Fire the success callback registered by call `index`.
    pub fn deliver_success(&self, index: usize, payload: Value) {
        let handler = self.calls.lock().unwrap()[index].on_success.clone();
        handler(payload);
    }

    /// Fire the error callback registered by call `index`.
    pub fn deliver_error(&self, index: usize, message: &str) {
        let handler = self.calls.lock().unwrap()[index].on_error.clone();
        handler(message.to_string());
    }
}

impl PluginBridge for RecordingBridge {
    fn invoke(
        &self,
        plugin: &str,
        method: &str,
        args: Vec<Value>,
        on_success: SuccessHandler,
        on_error: ErrorHandler,
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            plugin: plugin.to_string(),
            method: method.to_string(),
            args,
            on_success,
            on_error,
        });
    }
}

/// Delegate double with shared interior state; clone one copy into the
/// monitor and keep the other for assertions.
#[derive(Default, Clone)]
pub struct CollectingDelegate {
    pub ranged: Arc<Mutex<Vec<Vec<Beacon>>>>,
    pub entered: Arc<Mutex<Vec<Region>>>,
    pub exited: Arc<Mutex<Vec<Region>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub stopped: Arc<AtomicUsize>,
}

impl CollectingDelegate {
    pub fn stopped_count(&self) -> usize {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn total_events(&self) -> usize {
        self.ranged.lock().unwrap().len()
            + self.entered.lock().unwrap().len()
            + self.exited.lock().unwrap().len()
    }
}

impl BeaconDelegate for CollectingDelegate {
    fn on_beacons_ranged(&self, beacons: Vec<Beacon>) {
        self.ranged.lock().unwrap().push(beacons);
    }
    fn on_region_entered(&self, region: Region) {
        self.entered.lock().unwrap().push(region);
    }
    fn on_region_exited(&self, region: Region) {
        self.exited.lock().unwrap().push(region);
    }
    fn on_monitoring_stopped(&self) {
        self.stopped.fetch_add(1, Ordering::Relaxed);
    }
    fn on_error(&self, message: String) {
        self.errors.lock().unwrap().push(message);
    }
}

/// A beacon the way the native layer would report one.
pub fn beacon(uuid: &str, major: u32, minor: u32, rssi: i32) -> Beacon {
    Beacon {
        uuid: uuid.to_string(),
        major,
        minor,
        proximity: 2,
        accuracy: 1.5,
        rssi,
    }
}

/// Wire-form ranging envelope carrying the given beacons.
pub fn ranging_envelope(beacons: &[Beacon]) -> Value {
    serde_json::json!({
        "eventType": "didRangeBeacons",
        "beacons": beacons,
    })
}

/// Wire-form region-transition envelope.
pub fn region_envelope(event_type: &str, region: &Region) -> Value {
    serde_json::json!({
        "eventType": event_type,
        "region": region,
    })
}
