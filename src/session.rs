// Session token persistence and authentication against the remote API.
// The token is a single opaque string stored under a fixed key.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

use crate::error::{AuthError, SessionError};
use crate::gateway::FarmGateway;
use crate::models::{Credentials, User};

/// Key the session token is stored under.
pub const TOKEN_KEY: &str = "farmEyeToken";

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn token(&self) -> Result<Option<String>, SessionError>;
    async fn set_token(&self, token: &str) -> Result<(), SessionError>;
    async fn clear_token(&self) -> Result<(), SessionError>;
}

/// Key/value table in SQLite; survives restarts.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub async fn connect(path: &str) -> Result<Self, SessionError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    #[instrument(skip(self), fields(store = "sqlite", operation = "token"))]
    async fn token(&self) -> Result<Option<String>, SessionError> {
        let token = sqlx::query_scalar::<_, String>("SELECT value FROM session WHERE key = $1")
            .bind(TOKEN_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(token)
    }

    #[instrument(skip(self, token), fields(store = "sqlite", operation = "set_token"))]
    async fn set_token(&self, token: &str) -> Result<(), SessionError> {
        sqlx::query("INSERT OR REPLACE INTO session (key, value) VALUES ($1, $2)")
            .bind(TOKEN_KEY)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(store = "sqlite", operation = "clear_token"))]
    async fn clear_token(&self) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM session WHERE key = $1")
            .bind(TOKEN_KEY)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Process-local store (tests, ephemeral sessions).
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().map(|t| (*t).clone()).unwrap_or(None))
    }

    async fn set_token(&self, token: &str) -> Result<(), SessionError> {
        if let Ok(mut t) = self.token.lock() {
            *t = Some(token.to_string());
        }
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), SessionError> {
        if let Ok(mut t) = self.token.lock() {
            *t = None;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Authenticator {
    gateway: Arc<dyn FarmGateway>,
    store: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(gateway: Arc<dyn FarmGateway>, store: Arc<dyn SessionStore>) -> Self {
        Self { gateway, store }
    }

    pub async fn get_token(&self) -> Result<Option<String>, SessionError> {
        self.store.token().await
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AuthError> {
        Ok(self.gateway.validate_token(token).await?)
    }

    /// Stored token, validated. Missing token never reaches the network.
    pub async fn current_user(&self) -> Result<User, AuthError> {
        let token = self.get_token().await?.ok_or(AuthError::MissingToken)?;
        self.validate_token(&token).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let resp = self.gateway.login(credentials).await?;
        self.store.set_token(&resp.token).await?;
        info!(username = %credentials.username, "login succeeded");
        Ok(resp.user)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.clear_token().await?;
        info!("logged out");
        Ok(())
    }
}
