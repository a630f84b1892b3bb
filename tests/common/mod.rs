// Shared test helpers: stub FarmEye API + fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use farmeye::dashboard::Dashboard;
use farmeye::error::GatewayError;
use farmeye::gateway::FarmGateway;
use farmeye::models::*;
use farmeye::session::{MemorySessionStore, SessionStore};
use farmeye::state::StateStore;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

pub const TOKEN: &str = "valid-token";
pub const PASSWORD: &str = "hunter2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListFarms,
    Sensors,
    Soil,
    Weather,
    Login,
    Validate,
}

#[derive(Debug, Clone, Copy)]
pub enum Fail {
    Unauthorized,
    Forbidden,
    Status(u16),
    Transport,
}

/// In-process stand-in for the remote API. Accepts only `TOKEN`.
pub struct StubGateway {
    pub farms: Mutex<Vec<Farm>>,
    pub sensors: Mutex<Vec<Sensor>>,
    pub soil: Mutex<SoilData>,
    pub weather: Mutex<WeatherSnapshot>,
    failures: Mutex<HashMap<Op, Fail>>,
    calls: Mutex<Vec<(Op, Option<FarmId>)>>,
    sensor_delays: Mutex<VecDeque<Duration>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            farms: Mutex::new(vec![farm("a"), farm("b")]),
            sensors: Mutex::new(vec![sensor("s1", SensorStatus::Online, 80.0)]),
            soil: Mutex::new(SoilData {
                moisture: vec![reading("s1", 35.0)],
                ..SoilData::default()
            }),
            weather: Mutex::new(weather(Some(10.0), 70.0)),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            sensor_delays: Mutex::new(VecDeque::new()),
        }
    }
}

impl StubGateway {
    pub fn fail(&self, op: Op, fail: Fail) {
        self.failures.lock().unwrap().insert(op, fail);
    }

    pub fn heal(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    /// Each `farm_sensors` call pops one delay (none left = immediate).
    pub fn delay_sensors(&self, delays: &[Duration]) {
        self.sensor_delays.lock().unwrap().extend(delays.iter().copied());
    }

    pub fn calls(&self) -> Vec<(Op, Option<FarmId>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| matches!(o, Op::ListFarms | Op::Sensors | Op::Soil | Op::Weather))
            .count()
    }

    async fn enter(&self, op: Op, farm_id: Option<&FarmId>, token: Option<&str>) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push((op, farm_id.cloned()));
        let fail = self.failures.lock().unwrap().get(&op).copied();
        match fail {
            Some(Fail::Unauthorized) => {
                return Err(GatewayError::Unauthorized(StatusCode::UNAUTHORIZED));
            }
            Some(Fail::Forbidden) => {
                return Err(GatewayError::Unauthorized(StatusCode::FORBIDDEN));
            }
            Some(Fail::Status(code)) => {
                return Err(GatewayError::Status(
                    StatusCode::from_u16(code).unwrap(),
                ));
            }
            Some(Fail::Transport) => return Err(GatewayError::Transport(transport_error().await)),
            None => {}
        }
        match token {
            Some(t) if t != TOKEN => Err(GatewayError::Unauthorized(StatusCode::UNAUTHORIZED)),
            _ => Ok(()),
        }
    }
}

/// A real `reqwest::Error` without touching the network (URL without host).
pub async fn transport_error() -> reqwest::Error {
    reqwest::Client::new()
        .get("http://")
        .send()
        .await
        .unwrap_err()
}

#[async_trait]
impl FarmGateway for StubGateway {
    async fn list_farms(&self, token: &str) -> Result<Vec<Farm>, GatewayError> {
        self.enter(Op::ListFarms, None, Some(token)).await?;
        Ok(self.farms.lock().unwrap().clone())
    }

    async fn farm_sensors(&self, token: &str, farm_id: &FarmId) -> Result<Vec<Sensor>, GatewayError> {
        let delay = self.sensor_delays.lock().unwrap().pop_front();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        self.enter(Op::Sensors, Some(farm_id), Some(token)).await?;
        Ok(self.sensors.lock().unwrap().clone())
    }

    async fn farm_soil(&self, token: &str, farm_id: &FarmId) -> Result<SoilData, GatewayError> {
        self.enter(Op::Soil, Some(farm_id), Some(token)).await?;
        Ok(self.soil.lock().unwrap().clone())
    }

    async fn farm_weather(&self, token: &str, farm_id: &FarmId) -> Result<WeatherSnapshot, GatewayError> {
        self.enter(Op::Weather, Some(farm_id), Some(token)).await?;
        Ok(self.weather.lock().unwrap().clone())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
        self.enter(Op::Login, None, None).await?;
        if credentials.password != PASSWORD {
            return Err(GatewayError::Unauthorized(StatusCode::UNAUTHORIZED));
        }
        Ok(LoginResponse {
            token: TOKEN.into(),
            user: user(&credentials.username),
        })
    }

    async fn validate_token(&self, token: &str) -> Result<User, GatewayError> {
        self.enter(Op::Validate, None, Some(token)).await?;
        Ok(user("ann"))
    }
}

pub struct Harness {
    pub gateway: Arc<StubGateway>,
    pub session: Arc<MemorySessionStore>,
    pub dashboard: Arc<Dashboard>,
}

impl Harness {
    pub fn new(gateway: StubGateway, session: MemorySessionStore) -> Self {
        let gateway = Arc::new(gateway);
        let session = Arc::new(session);
        let store = Arc::new(StateStore::new(Duration::from_secs(5), 16));
        let dashboard = Arc::new(Dashboard::new(
            gateway.clone() as Arc<dyn FarmGateway>,
            session.clone() as Arc<dyn SessionStore>,
            store,
        ));
        Self {
            gateway,
            session,
            dashboard,
        }
    }

    pub fn logged_in() -> Self {
        Self::new(StubGateway::default(), MemorySessionStore::with_token(TOKEN))
    }

    pub fn logged_out() -> Self {
        Self::new(StubGateway::default(), MemorySessionStore::default())
    }

    pub fn store(&self) -> &Arc<StateStore> {
        self.dashboard.store()
    }
}

pub fn farm(id: &str) -> Farm {
    Farm {
        id: FarmId::from(id),
        name: format!("Farm {}", id.to_uppercase()),
        location: GeoPoint {
            latitude: 38.9,
            longitude: -77.0,
        },
        boundary: None,
    }
}

pub fn sensor(id: &str, status: SensorStatus, battery: f64) -> Sensor {
    Sensor {
        id: SensorId::from(id),
        kind: "soil".into(),
        location: GeoPoint {
            latitude: 38.91,
            longitude: -77.01,
        },
        status,
        battery,
    }
}

pub fn reading(sensor_id: &str, value: f64) -> SoilReading {
    SoilReading {
        sensor_id: SensorId::from(sensor_id),
        value,
        timestamp: DateTime::<Utc>::UNIX_EPOCH,
        location: None,
    }
}

/// Forecast with a next-24h summary and one daily entry.
pub fn weather(precipitation: Option<f64>, max_temperature: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        current: CurrentConditions {
            temperature: 72.0,
            humidity: 40.0,
            wind_speed: 5.0,
            wind_direction: "NW".into(),
            condition: "Sunny".into(),
        },
        forecast: Forecast {
            precipitation,
            temperature: Some(TemperatureRange {
                min: 55.0,
                max: max_temperature,
            }),
            daily: vec![DailyForecast {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                temperature: TemperatureRange {
                    min: 55.0,
                    max: max_temperature,
                },
                precipitation,
                condition: "Sunny".into(),
            }],
        },
    }
}

pub fn user(username: &str) -> User {
    User {
        id: "u1".into(),
        username: username.into(),
        name: Some("Ann Farmer".into()),
        email: Some("ann@farm.io".into()),
        extra: serde_json::Map::new(),
    }
}

pub fn credentials(password: &str) -> Credentials {
    Credentials {
        username: "ann".into(),
        password: password.into(),
    }
}
