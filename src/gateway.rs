// Remote FarmEye API: farms, sensors, soil, weather, auth.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

use crate::error::GatewayError;
use crate::models::{
    Credentials, Farm, FarmId, LoginResponse, Sensor, SoilData, User, WeatherSnapshot,
};

/// Everything the dashboard needs from the remote API. Every call except `login`
/// is authenticated with a bearer token.
#[async_trait]
pub trait FarmGateway: Send + Sync {
    async fn list_farms(&self, token: &str) -> Result<Vec<Farm>, GatewayError>;
    async fn farm_sensors(&self, token: &str, farm_id: &FarmId)
    -> Result<Vec<Sensor>, GatewayError>;
    async fn farm_soil(&self, token: &str, farm_id: &FarmId) -> Result<SoilData, GatewayError>;
    async fn farm_weather(
        &self,
        token: &str,
        farm_id: &FarmId,
    ) -> Result<WeatherSnapshot, GatewayError>;
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError>;
    async fn validate_token(&self, token: &str) -> Result<User, GatewayError>;
}

pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base = Url::parse(endpoint)
            .map_err(|e| GatewayError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(endpoint.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::version::user_agent())
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self { client, base })
    }

    /// `{endpoint}/{segments...}`; segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GatewayError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: &str,
    ) -> Result<T, GatewayError> {
        let url = self.url(segments)?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }
        resp.json::<T>().await.map_err(GatewayError::Decode)
    }
}

#[async_trait]
impl FarmGateway for HttpGateway {
    #[instrument(skip(self, token), fields(gateway = "http", operation = "list_farms"))]
    async fn list_farms(&self, token: &str) -> Result<Vec<Farm>, GatewayError> {
        self.get_json(&["farms"], token).await
    }

    #[instrument(skip(self, token, farm_id), fields(gateway = "http", operation = "farm_sensors", farm_id = %farm_id))]
    async fn farm_sensors(
        &self,
        token: &str,
        farm_id: &FarmId,
    ) -> Result<Vec<Sensor>, GatewayError> {
        self.get_json(&["farms", farm_id.as_str(), "sensors"], token)
            .await
    }

    #[instrument(skip(self, token, farm_id), fields(gateway = "http", operation = "farm_soil", farm_id = %farm_id))]
    async fn farm_soil(&self, token: &str, farm_id: &FarmId) -> Result<SoilData, GatewayError> {
        self.get_json(&["farms", farm_id.as_str(), "soil"], token)
            .await
    }

    #[instrument(skip(self, token, farm_id), fields(gateway = "http", operation = "farm_weather", farm_id = %farm_id))]
    async fn farm_weather(
        &self,
        token: &str,
        farm_id: &FarmId,
    ) -> Result<WeatherSnapshot, GatewayError> {
        self.get_json(&["farms", farm_id.as_str(), "weather"], token)
            .await
    }

    #[instrument(skip(self, credentials), fields(gateway = "http", operation = "login", username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
        let url = self.url(&["auth", "login"])?;
        let resp = self
            .client
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }
        resp.json::<LoginResponse>()
            .await
            .map_err(GatewayError::Decode)
    }

    #[instrument(skip(self, token), fields(gateway = "http", operation = "validate_token"))]
    async fn validate_token(&self, token: &str) -> Result<User, GatewayError> {
        self.get_json(&["auth", "validate"], token).await
    }
}
