use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the FarmEye REST API, e.g. "https://api.farmeye.com/v1".
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// How long an error banner stays up.
    #[serde(default = "default_error_banner_ms")]
    pub error_banner_ms: u64,
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_error_banner_ms() -> u64 {
    5_000
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            error_banner_ms: default_error_banner_ms(),
        }
    }
}

/// Initial map view; handed to clients as-is via GET /api/config.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lng")]
    pub center_lng: f64,
    #[serde(default = "default_tile_provider")]
    pub tile_provider: String,
}

fn default_initial_zoom() -> u8 {
    12
}

fn default_center_lat() -> f64 {
    38.9072
}

fn default_center_lng() -> f64 {
    -77.0369
}

fn default_tile_provider() -> String {
    "openstreetmap".into()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_zoom: default_initial_zoom(),
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            tile_provider: default_tile_provider(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    pub initial_zoom: u8,
    pub center: MapCenter,
    pub tile_provider: String,
}

impl MapConfig {
    pub fn settings(&self) -> MapSettings {
        MapSettings {
            initial_zoom: self.initial_zoom,
            center: MapCenter {
                lat: self.center_lat,
                lng: self.center_lng,
            },
            tile_provider: self.tile_provider.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// SQLite file holding the session token.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of notices kept for /ws/dashboard clients (slow clients may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_broadcast_capacity() -> usize {
    64
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.api.endpoint.starts_with("http://") || self.api.endpoint.starts_with("https://"),
            "api.endpoint must be an http(s) URL, got {:?}",
            self.api.endpoint
        );
        anyhow::ensure!(
            self.api.request_timeout_secs > 0,
            "api.request_timeout_secs must be > 0, got {}",
            self.api.request_timeout_secs
        );
        anyhow::ensure!(
            self.refresh.interval_ms > 0,
            "refresh.interval_ms must be > 0, got {}",
            self.refresh.interval_ms
        );
        anyhow::ensure!(
            self.refresh.error_banner_ms > 0,
            "refresh.error_banner_ms must be > 0, got {}",
            self.refresh.error_banner_ms
        );
        anyhow::ensure!(
            (-90.0..=90.0).contains(&self.map.center_lat),
            "map.center_lat must be within [-90, 90], got {}",
            self.map.center_lat
        );
        anyhow::ensure!(
            (-180.0..=180.0).contains(&self.map.center_lng),
            "map.center_lng must be within [-180, 180], got {}",
            self.map.center_lng
        );
        anyhow::ensure!(
            !self.session.path.is_empty(),
            "session.path must be non-empty"
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        Ok(())
    }
}
