// Farms and geographic points

use serde::{Deserialize, Serialize};
use std::fmt;

/// Farm identifier as issued by the API (opaque string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FarmId(pub String);

impl FarmId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FarmId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub location: GeoPoint,
    /// Boundary polygon, drawn on the map when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Vec<GeoPoint>>,
}
