// Soil readings grouped by metric

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{GeoPoint, SensorId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilReading {
    pub sensor_id: SensorId,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Response of GET /farms/{id}/soil: metric name -> chronological readings.
/// Moisture and temperature drive charts and alerts; any other key (extra metrics,
/// scalar metadata such as `"unit"`) is carried through untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilData {
    #[serde(default)]
    pub moisture: Vec<SoilReading>,
    #[serde(default)]
    pub temperature: Vec<SoilReading>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl SoilData {
    pub fn is_empty(&self) -> bool {
        self.moisture.is_empty()
            && self.temperature.is_empty()
            && self
                .other
                .values()
                .all(|v| v.as_array().is_none_or(Vec::is_empty))
    }
}
