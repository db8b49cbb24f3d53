// Beacon and region value types — what actually crosses the bridge

use serde::{Deserialize, Serialize};

/// Factory-default UUID programmed into Kontakt.io hardware out of the box.
///
/// A wildcard [`Region`] is matched natively against this UUID with major and
/// minor left unconstrained. Published so embedders can build explicit regions
/// that target factory-fresh beacons.
pub const KONTAKT_FACTORY_UUID: &str = "f7826da6-4fa2-4e98-8024-bc5b71e0893e";

/// A set of beacons to monitor, identified by UUID/major/minor.
///
/// All fields are optional; a region with no fields set serializes to `{}`
/// and tells the native layer "match every beacon under the factory UUID,
/// any major, any minor". Matching itself happens natively; this type is
/// only the request vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Proximity UUID of the region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Major value of the region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<u32>,
    /// Minor value of the region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor: Option<u32>,
}

impl Region {
    /// Fully specified region.
    pub fn new(uuid: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            uuid: Some(uuid.into()),
            major: Some(major),
            minor: Some(minor),
        }
    }

    /// Region constrained to a UUID only, wildcard major/minor.
    pub fn with_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            major: None,
            minor: None,
        }
    }

    /// The wildcard region: factory UUID, any major, any minor.
    pub fn all() -> Self {
        Self::default()
    }

    /// True when no field constrains the match.
    pub fn is_wildcard(&self) -> bool {
        self.uuid.is_none() && self.major.is_none() && self.minor.is_none()
    }
}

/// A detected transmitter's identity plus signal readings at one ranging tick.
///
/// Produced only by the native collaborator; this layer never constructs one
/// outside of tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    /// Proximity UUID of the beacon.
    pub uuid: String,
    /// Major value of the beacon.
    pub major: u32,
    /// Minor value of the beacon.
    pub minor: u32,
    /// Raw proximity class as reported natively (CoreLocation numbering).
    /// Decode with [`Proximity::from_raw`].
    pub proximity: i32,
    /// Estimated distance in meters. Negative when the estimate is invalid.
    pub accuracy: f64,
    /// Received Signal Strength Indication, dBm.
    pub rssi: i32,
}

/// Decoded proximity class of a ranged beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proximity {
    /// Distance could not be determined.
    Unknown,
    /// Within roughly half a meter.
    Immediate,
    /// Within a few meters.
    Near,
    /// Detected, but further out.
    Far,
}

impl Proximity {
    /// Map the native enum-like number to a proximity class.
    ///
    /// Out-of-range values collapse to `Unknown`, matching how the native
    /// layer reports undeterminable distance.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Proximity::Immediate,
            2 => Proximity::Near,
            3 => Proximity::Far,
            _ => Proximity::Unknown,
        }
    }
}
