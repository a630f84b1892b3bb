// Error types for the gateway, session store and dashboard commands

use reqwest::StatusCode;

use crate::models::FarmId;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request rejected: {0}")]
    Unauthorized(StatusCode),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    #[error("http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl GatewayError {
    /// Network-level failure (no HTTP response at all).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// 401 only: the token itself was refused. A 403 is a per-resource denial.
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, Self::Unauthorized(s) if *s == StatusCode::UNAUTHORIZED)
    }

    pub(crate) fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Unauthorized(status)
        } else {
            Self::Status(status)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("session store: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no authentication token found")]
    MissingToken,
    #[error("invalid authentication token")]
    Rejected,
    #[error(transparent)]
    Gateway(GatewayError),
    #[error(transparent)]
    Store(#[from] SessionError),
}

impl From<GatewayError> for AuthError {
    fn from(e: GatewayError) -> Self {
        if e.is_unauthorized() {
            Self::Rejected
        } else {
            Self::Gateway(e)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("unknown farm {0}")]
    UnknownFarm(FarmId),
    #[error("no farm selected")]
    NoFarmSelected,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
