// Weather: current conditions + forecast

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Degrees Fahrenheit.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Miles per hour.
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_direction: String,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature: TemperatureRange,
    /// Precipitation probability, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub condition: String,
}

/// Forecast: a next-24-hour summary plus daily entries (chronological).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TemperatureRange>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

/// Next-24-hour view of a forecast, used for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outlook {
    pub precipitation: Option<f64>,
    pub max_temperature: Option<f64>,
}

impl Forecast {
    /// Summary fields win; each missing one falls back to the first daily entry.
    pub fn outlook(&self) -> Outlook {
        let first = self.daily.first();
        Outlook {
            precipitation: self.precipitation.or_else(|| first.and_then(|d| d.precipitation)),
            max_temperature: self
                .temperature
                .map(|t| t.max)
                .or_else(|| first.map(|d| d.temperature.max)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Forecast,
}
