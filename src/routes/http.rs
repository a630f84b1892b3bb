// HTTP handlers: version, config, dashboard snapshot, commands, forms

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::contact::{ContactForm, NewsletterForm, validate_contact, validate_newsletter};
use crate::dashboard::{Command, LOGIN_ERROR};
use crate::error::{AuthError, DashboardError};
use crate::models::{Credentials, FarmId};
use crate::state::View;
use crate::version::{NAME, VERSION};

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Hand a command to the refresh worker; 202 once queued.
async fn enqueue(state: &AppState, command: Command) -> Response {
    match state.commands.send(command).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(_) => error_response(StatusCode::SERVICE_UNAVAILABLE, "refresh worker stopped"),
    }
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/config: static client settings (map view, refresh period).
pub(super) async fn config_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "map": state.config.map.settings(),
        "refreshIntervalMs": state.config.refresh.interval_ms,
    }))
}

/// GET /api/dashboard: current application state.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.store().snapshot())
}

/// POST /api/login: answered synchronously with the user or 401.
pub(super) async fn login_handler(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Response {
    match state.dashboard.login(&credentials).await {
        Ok(user) => Json(user).into_response(),
        Err(DashboardError::Auth(AuthError::Rejected)) => {
            error_response(StatusCode::UNAUTHORIZED, LOGIN_ERROR)
        }
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

/// POST /api/logout
pub(super) async fn logout_handler(State(state): State<AppState>) -> StatusCode {
    state.dashboard.logout().await;
    StatusCode::NO_CONTENT
}

/// POST /api/farms/load
pub(super) async fn load_farms_handler(State(state): State<AppState>) -> Response {
    if state.dashboard.store().snapshot().view != View::Dashboard {
        return error_response(StatusCode::UNAUTHORIZED, "not authenticated");
    }
    enqueue(&state, Command::LoadFarms).await
}

/// POST /api/farms/{id}/select: 404 for farms not in the current list.
pub(super) async fn select_farm_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let snapshot = state.dashboard.store().snapshot();
    if snapshot.view != View::Dashboard {
        return error_response(StatusCode::UNAUTHORIZED, "not authenticated");
    }
    let farm_id = FarmId(id);
    if !snapshot.farms.iter().any(|f| f.id == farm_id) {
        return error_response(StatusCode::NOT_FOUND, format!("unknown farm {farm_id}"));
    }
    enqueue(&state, Command::SelectFarm { farm_id }).await
}

/// POST /api/refresh: manual refresh of the selected farm; does not reset the timer.
pub(super) async fn refresh_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.dashboard.store().snapshot();
    if snapshot.view != View::Dashboard {
        return error_response(StatusCode::UNAUTHORIZED, "not authenticated");
    }
    if snapshot.current_farm_id.is_none() {
        return error_response(StatusCode::CONFLICT, "no farm selected");
    }
    enqueue(&state, Command::Refresh).await
}

/// POST /api/contact: 422 with per-field messages until every field passes.
pub(super) async fn contact_handler(Json(form): Json<ContactForm>) -> Response {
    match validate_contact(&form) {
        Ok(()) => {
            tracing::info!(operation = "contact", email = %form.email.trim(), "contact message accepted");
            (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({ "status": "accepted" })),
            )
                .into_response()
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
    }
}

/// POST /api/newsletter
pub(super) async fn newsletter_handler(Json(form): Json<NewsletterForm>) -> Response {
    match validate_newsletter(&form) {
        Ok(()) => {
            tracing::info!(operation = "newsletter", email = %form.email.trim(), "newsletter subscription accepted");
            (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({ "status": "subscribed" })),
            )
                .into_response()
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
    }
}
