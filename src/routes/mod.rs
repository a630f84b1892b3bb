// HTTP + WebSocket routes for dashboard clients

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::dashboard::{Command, Dashboard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) dashboard: Arc<Dashboard>,
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) config: AppConfig,
}

pub fn app(
    dashboard: Arc<Dashboard>,
    commands: mpsc::Sender<Command>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        dashboard,
        commands,
        config,
    };
    Router::new()
        .route("/", get(|| async { "FarmEye dashboard service" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/config", get(http::config_handler)) // GET /api/config
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/login", post(http::login_handler)) // POST /api/login
        .route("/api/logout", post(http::logout_handler)) // POST /api/logout
        .route("/api/farms/load", post(http::load_farms_handler)) // POST /api/farms/load
        .route("/api/farms/{id}/select", post(http::select_farm_handler)) // POST /api/farms/{id}/select
        .route("/api/refresh", post(http::refresh_handler)) // POST /api/refresh
        .route("/api/contact", post(http::contact_handler)) // POST /api/contact
        .route("/api/newsletter", post(http::newsletter_handler)) // POST /api/newsletter
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
