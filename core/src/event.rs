// Event envelope decoding — the tagged union delivered on the success channel

use crate::beacon::{Beacon, Region};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event delivered by the native beacon subsystem.
///
/// The wire form is a JSON object tagged by `eventType`:
///
/// ```json
/// { "eventType": "didRangeBeacons", "beacons": [ ... ] }
/// { "eventType": "didEnterRegion",  "region": { ... } }
/// { "eventType": "didExitRegion",   "region": { ... } }
/// ```
///
/// The union is closed at this boundary: an envelope whose discriminant is
/// not one of the three known values fails to decode and the router drops it,
/// so future native additions cannot misroute into an existing arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum BeaconEvent {
    /// A ranging tick: every matching beacon currently in range, with signal
    /// readings, in the order the native layer reported them.
    #[serde(rename = "didRangeBeacons")]
    RangedBeacons { beacons: Vec<Beacon> },
    /// Crossed into proximity of a monitored region.
    #[serde(rename = "didEnterRegion")]
    EnteredRegion { region: Region },
    /// Left proximity of a monitored region.
    #[serde(rename = "didExitRegion")]
    ExitedRegion { region: Region },
}

impl BeaconEvent {
    /// Decode a raw envelope from the bridge success channel.
    pub fn decode(envelope: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(envelope)
    }
}
