// Field sensors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoPoint;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(pub String);

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sensor connectivity; serializes to lowercase JSON (e.g. "online").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Online,
    Offline,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: SensorId,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: GeoPoint,
    pub status: SensorStatus,
    /// Battery level, 0-100.
    pub battery: f64,
}
