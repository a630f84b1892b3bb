// Alert derivation: threshold rules over the current farm's data.
// Rules run independently and are concatenated in rule order; within a rule,
// alerts follow the input order. Nothing is merged or suppressed.

use chrono::{DateTime, Utc};

use crate::models::{Alert, SensorStatus, Severity};
use crate::state::ApplicationState;

/// Soil moisture below this (percent) is a warning.
pub const LOW_MOISTURE_PERCENT: f64 = 20.0;
/// Forecast precipitation probability above this (percent) is info.
pub const HIGH_PRECIPITATION_PERCENT: f64 = 80.0;
/// Forecast max temperature above this (°F) is a warning.
pub const EXTREME_HEAT_F: f64 = 95.0;
/// Sensor battery below this (percent) is an error.
pub const LOW_BATTERY_PERCENT: f64 = 10.0;

/// Pure: same state and `now` give the same alerts.
pub fn derive_alerts(state: &ApplicationState, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for reading in &state.soil.moisture {
        if reading.value < LOW_MOISTURE_PERCENT {
            alerts.push(Alert {
                sensor_id: Some(reading.sensor_id.clone()),
                location: reading.location,
                ..Alert::new(
                    Severity::Warning,
                    format!(
                        "Low soil moisture ({}%) at sensor {}",
                        reading.value, reading.sensor_id
                    ),
                    now,
                )
            });
        }
    }

    if let Some(weather) = &state.weather {
        let outlook = weather.forecast.outlook();
        if let Some(p) = outlook.precipitation
            && p > HIGH_PRECIPITATION_PERCENT
        {
            alerts.push(Alert::new(
                Severity::Info,
                format!("High precipitation chance ({p}%) forecasted in the next 24 hours"),
                now,
            ));
        }
        if let Some(t) = outlook.max_temperature
            && t > EXTREME_HEAT_F
        {
            alerts.push(Alert::new(
                Severity::Warning,
                format!("Extreme heat warning: {t}°F expected"),
                now,
            ));
        }
    }

    for sensor in &state.sensors {
        if sensor.status == SensorStatus::Offline || sensor.battery < LOW_BATTERY_PERCENT {
            alerts.push(Alert {
                sensor_id: Some(sensor.id.clone()),
                location: Some(sensor.location),
                ..Alert::new(
                    Severity::Error,
                    format!(
                        "Sensor {} offline or low battery ({}%)",
                        sensor.id, sensor.battery
                    ),
                    now,
                )
            });
        }
    }

    alerts
}
