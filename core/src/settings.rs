// Monitor settings — tunables persisted as JSON next to the app's data

use crate::BridgeError;
use serde::{Deserialize, Serialize};

/// Bounds for the per-subscription event buffer.
const MIN_BUFFER_CAPACITY: usize = 1;
const MAX_BUFFER_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Bounded capacity of each subscription stream. A subscriber that falls
    /// behind loses its own copy of overflowing events.
    pub event_buffer_capacity: usize,
    /// Leave a debug log line when an unrecognized envelope is dropped.
    pub log_unknown_events: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            event_buffer_capacity: 64,
            log_unknown_events: true,
        }
    }
}

pub struct MonitorSettingsManager {
    storage_path: std::path::PathBuf,
}

impl MonitorSettingsManager {
    pub fn new(storage_path: String) -> Self {
        Self {
            storage_path: std::path::PathBuf::from(storage_path),
        }
    }

    pub fn load(&self) -> Result<MonitorSettings, BridgeError> {
        let settings_file = self.storage_path.join("monitor_settings.json");
        if settings_file.exists() {
            let data = std::fs::read_to_string(&settings_file)
                .map_err(|_| BridgeError::StorageError)?;
            let settings: MonitorSettings =
                serde_json::from_str(&data).map_err(|_| BridgeError::Internal)?;
            Ok(settings)
        } else {
            Ok(MonitorSettings::default())
        }
    }

    pub fn save(&self, settings: MonitorSettings) -> Result<(), BridgeError> {
        self.validate(&settings)?;

        std::fs::create_dir_all(&self.storage_path).map_err(|_| BridgeError::StorageError)?;

        let settings_file = self.storage_path.join("monitor_settings.json");
        let data =
            serde_json::to_string_pretty(&settings).map_err(|_| BridgeError::Internal)?;
        std::fs::write(&settings_file, data).map_err(|_| BridgeError::StorageError)?;

        Ok(())
    }

    pub fn validate(&self, settings: &MonitorSettings) -> Result<(), BridgeError> {
        // A zero-capacity channel would block dispatch inside the bridge
        // callback; an unbounded one would hide a stalled consumer forever.
        if settings.event_buffer_capacity < MIN_BUFFER_CAPACITY
            || settings.event_buffer_capacity > MAX_BUFFER_CAPACITY
        {
            return Err(BridgeError::InvalidInput);
        }
        Ok(())
    }

    pub fn default_settings(&self) -> MonitorSettings {
        MonitorSettings::default()
    }
}
