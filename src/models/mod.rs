// Domain models (FarmEye REST API wire types + derived alerts)

mod alert;
mod farm;
mod sensor;
mod soil;
mod user;
mod weather;

pub use alert::{Alert, Severity};
pub use farm::{Farm, FarmId, GeoPoint};
pub use sensor::{Sensor, SensorId, SensorStatus};
pub use soil::{SoilData, SoilReading};
pub use user::{Credentials, LoginResponse, User};
pub use weather::{
    CurrentConditions, DailyForecast, Forecast, Outlook, TemperatureRange, WeatherSnapshot,
};
