// Plugin bridge primitive — the sole doorway to native code

use serde_json::Value;
use std::sync::Arc;

/// Plugin identifier the native side registered under.
pub const PLUGIN_IDENTIFIER: &str = "CordovaKontaktio";

/// Native method: begin monitoring, args `[regions]`.
pub const METHOD_START_MONITORING: &str = "jsapi_startMonitoringBeacons";

/// Native method: stop monitoring, args `[]`.
pub const METHOD_STOP_MONITORING: &str = "jsapi_stopMonitoringBeacons";

/// Success callback registered with an invocation.
///
/// For `jsapi_startMonitoringBeacons` this handler is long-lived: the native
/// side keeps it and fires it once per event for as long as monitoring runs.
/// For one-shot methods it fires at most once, with whatever acknowledgment
/// payload the native side produces (possibly `null`).
pub type SuccessHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Error callback registered with an invocation. Carries a human-readable
/// message; there is no structured error code on the native side.
pub type ErrorHandler = Arc<dyn Fn(String) + Send + Sync>;

/// The generic invocation primitive connecting this layer to native code.
///
/// Implementors own everything behind the call: serialization framing,
/// threading, platform permissions, the BLE stack. This layer only promises
/// to hand over well-formed JSON args and to treat the callbacks as the
/// single channel pair for results.
///
/// `invoke` must not block. Callbacks may fire on any thread, at any later
/// time, and (for long-lived registrations) repeatedly; implementors choose
/// the dispatch mechanism and ordering is expected to follow production
/// order per registration.
pub trait PluginBridge: Send + Sync {
    fn invoke(
        &self,
        plugin: &str,
        method: &str,
        args: Vec<Value>,
        on_success: SuccessHandler,
        on_error: ErrorHandler,
    );
}
