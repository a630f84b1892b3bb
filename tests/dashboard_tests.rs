// Dashboard controller: startup auth check, login/logout, farm list, selection

mod common;

use common::{Fail, Harness, Op, PASSWORD, StubGateway, TOKEN, credentials, farm};
use farmeye::dashboard::{Command, FARMS_ERROR, LOGIN_ERROR};
use farmeye::error::{AuthError, DashboardError};
use farmeye::models::FarmId;
use farmeye::refresh::RefreshOutcome;
use farmeye::session::{MemorySessionStore, SessionStore};
use farmeye::state::View;

#[tokio::test]
async fn test_start_without_token_shows_login_and_fetches_nothing() {
    let h = Harness::logged_out();
    assert_eq!(h.dashboard.start().await, View::Unauthenticated);

    assert!(h.gateway.calls().is_empty());
    let state = h.store().snapshot();
    assert_eq!(state.view, View::Unauthenticated);
    assert!(state.farms.is_empty());
}

#[tokio::test]
async fn test_start_with_valid_token_loads_first_farm() {
    let h = Harness::logged_in();
    assert_eq!(h.dashboard.start().await, View::Dashboard);

    let state = h.store().snapshot();
    assert_eq!(state.farms.len(), 2);
    assert_eq!(state.current_farm_id, Some(FarmId::from("a")));
    assert_eq!(state.user.as_ref().map(|u| u.username.as_str()), Some("ann"));
    assert!(!state.sensors.is_empty());
    assert!(state.last_updated.is_some());
    assert!(
        h.gateway
            .calls()
            .iter()
            .filter(|(op, _)| matches!(op, Op::Sensors | Op::Soil | Op::Weather))
            .all(|(_, farm)| farm == &Some(FarmId::from("a")))
    );
}

#[tokio::test]
async fn test_start_with_rejected_token_shows_login() {
    let h = Harness::new(
        StubGateway::default(),
        MemorySessionStore::with_token("stale"),
    );
    assert_eq!(h.dashboard.start().await, View::Unauthenticated);
    assert_eq!(h.gateway.count(Op::Validate), 1);
    assert_eq!(h.gateway.fetch_count(), 0);
}

#[tokio::test]
async fn test_start_reports_login_view_when_farm_list_refuses_token() {
    let h = Harness::logged_in();
    h.gateway.fail(Op::ListFarms, Fail::Unauthorized);

    assert_eq!(h.dashboard.start().await, View::Unauthenticated);
    assert_eq!(h.store().snapshot().view, View::Unauthenticated);
    assert_eq!(h.session.token().await.unwrap(), None);
    assert_eq!(h.gateway.count(Op::Sensors), 0);
}

#[tokio::test]
async fn test_start_stays_on_dashboard_when_one_slice_is_forbidden() {
    let h = Harness::logged_in();
    h.gateway.fail(Op::Soil, Fail::Forbidden);

    assert_eq!(h.dashboard.start().await, View::Dashboard);
    let state = h.store().snapshot();
    assert_eq!(state.view, View::Dashboard);
    assert!(!state.sensors.is_empty());
    assert!(state.weather.is_some());
    assert!(state.soil.is_empty());
}

#[tokio::test]
async fn test_login_persists_token_and_enters_dashboard() {
    let h = Harness::logged_out();
    h.dashboard.start().await;

    let user = h.dashboard.login(&credentials(PASSWORD)).await.unwrap();
    assert_eq!(user.username, "ann");
    assert_eq!(h.session.token().await.unwrap().as_deref(), Some(TOKEN));

    let state = h.store().snapshot();
    assert_eq!(state.view, View::Dashboard);
    assert_eq!(state.current_farm_id, Some(FarmId::from("a")));
}

#[tokio::test]
async fn test_login_with_bad_password_raises_banner() {
    let h = Harness::logged_out();
    let err = h.dashboard.login(&credentials("wrong")).await.unwrap_err();
    assert!(matches!(err, DashboardError::Auth(AuthError::Rejected)));

    let state = h.store().snapshot();
    assert_eq!(state.view, View::Unauthenticated);
    assert_eq!(state.error.map(|b| b.message), Some(LOGIN_ERROR.to_string()));
    assert_eq!(h.session.token().await.unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_token_and_state() {
    let h = Harness::logged_in();
    h.dashboard.start().await;
    h.dashboard.logout().await;

    assert_eq!(h.session.token().await.unwrap(), None);
    let state = h.store().snapshot();
    assert_eq!(state.view, View::Unauthenticated);
    assert!(state.farms.is_empty());
    assert!(state.current_farm_id.is_none());
}

#[tokio::test]
async fn test_load_farms_failure_raises_banner_and_keeps_list() {
    let h = Harness::logged_in();
    h.dashboard.start().await;
    h.gateway.fail(Op::ListFarms, Fail::Status(503));

    assert!(h.dashboard.load_farms().await.is_err());
    let state = h.store().snapshot();
    assert_eq!(state.farms.len(), 2);
    assert_eq!(state.error.map(|b| b.message), Some(FARMS_ERROR.to_string()));
}

#[tokio::test]
async fn test_load_farms_keeps_selection_still_listed() {
    let h = Harness::logged_in();
    h.dashboard.start().await;
    h.dashboard.select_farm(&FarmId::from("b")).await.unwrap();
    let sensor_calls = h.gateway.count(Op::Sensors);

    assert_eq!(h.dashboard.load_farms().await.unwrap(), None);
    assert_eq!(
        h.store().snapshot().current_farm_id,
        Some(FarmId::from("b"))
    );
    // Unchanged selection: no extra refresh.
    assert_eq!(h.gateway.count(Op::Sensors), sensor_calls);
}

#[tokio::test]
async fn test_load_farms_reselects_when_selection_vanishes() {
    let h = Harness::logged_in();
    h.dashboard.start().await;
    *h.gateway.farms.lock().unwrap() = vec![farm("c")];

    assert_eq!(
        h.dashboard.load_farms().await.unwrap(),
        Some(FarmId::from("c"))
    );
    assert!(
        h.gateway
            .calls()
            .contains(&(Op::Weather, Some(FarmId::from("c"))))
    );
}

#[tokio::test]
async fn test_select_unknown_farm_is_rejected() {
    let h = Harness::logged_in();
    h.dashboard.start().await;

    let err = h
        .dashboard
        .select_farm(&FarmId::from("zzz"))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::UnknownFarm(_)));
    assert_eq!(
        h.store().snapshot().current_farm_id,
        Some(FarmId::from("a"))
    );
}

#[tokio::test]
async fn test_select_farm_refreshes_new_farm() {
    let h = Harness::logged_in();
    h.dashboard.start().await;

    let outcome = h.dashboard.select_farm(&FarmId::from("b")).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Applied { .. }));
    assert!(
        h.gateway
            .calls()
            .contains(&(Op::Soil, Some(FarmId::from("b"))))
    );
}

#[tokio::test]
async fn test_refresh_current_requires_login_and_selection() {
    let h = Harness::logged_out();
    h.dashboard.start().await;
    assert!(matches!(
        h.dashboard.refresh_current().await,
        Err(DashboardError::NotAuthenticated)
    ));

    let h = Harness::logged_in();
    *h.gateway.farms.lock().unwrap() = vec![];
    h.dashboard.start().await;
    assert!(matches!(
        h.dashboard.refresh_current().await,
        Err(DashboardError::NoFarmSelected)
    ));
}

#[tokio::test]
async fn test_dispatch_parses_and_runs_commands() {
    let h = Harness::logged_in();
    h.dashboard.start().await;

    let command: Command =
        serde_json::from_str(r#"{"command":"selectFarm","farmId":"b"}"#).unwrap();
    h.dashboard.dispatch(command).await.unwrap();
    assert_eq!(
        h.store().snapshot().current_farm_id,
        Some(FarmId::from("b"))
    );

    let command: Command = serde_json::from_str(r#"{"command":"logout"}"#).unwrap();
    h.dashboard.dispatch(command).await.unwrap();
    assert_eq!(h.store().snapshot().view, View::Unauthenticated);

    let command: Command = serde_json::from_str(
        r#"{"command":"login","username":"ann","password":"hunter2"}"#,
    )
    .unwrap();
    h.dashboard.dispatch(command).await.unwrap();
    assert_eq!(h.store().snapshot().view, View::Dashboard);
}
