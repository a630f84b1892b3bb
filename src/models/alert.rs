// Derived alerts (never persisted; regenerated on every refresh)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, SensorId};

/// Alert severity; serializes to lowercase JSON (e.g. "warning").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<SensorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Alert {
    pub fn new(severity: Severity, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp,
            sensor_id: None,
            location: None,
        }
    }
}
