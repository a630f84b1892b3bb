// WebSocket: dashboard snapshots and notices out, commands in

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::dashboard::Command;
use crate::state::{ApplicationState, Notice};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Outgoing<'a> {
    State { state: &'a ApplicationState },
    Notice { notice: &'a Notice },
}

pub(super) async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_dashboard(socket, state).await {
            tracing::info!("Dashboard stream error: {}", e);
        }
    })
}

/// Sends one JSON text frame. `Ok(false)` means the client is gone or too slow.
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> anyhow::Result<bool> {
    let json = serde_json::to_string(value)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_dashboard(mut socket: WebSocket, state: AppState) -> anyhow::Result<()> {
    tracing::info!("Client connected to dashboard stream");

    let store = state.dashboard.store();
    let mut states = store.subscribe();
    let mut notices = store.subscribe_notices();

    let welcome = states.borrow_and_update().clone();
    if !send_json(&mut socket, &Outgoing::State { state: &welcome }).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = states.borrow_and_update().clone();
                if !send_json(&mut socket, &Outgoing::State { state: &snapshot }).await? {
                    break;
                }
            }
            result = notices.recv() => {
                match result {
                    Ok(notice) => {
                        if !send_json(&mut socket, &Outgoing::Notice { notice: &notice }).await? {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/dashboard client lagged, skipped {} notices", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Command>(text.as_str()) {
                            Ok(command) => {
                                if state.commands.send(command).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::debug!(error = %e, "ignoring malformed command"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "dashboard socket receive failed");
                        break;
                    }
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    Ok(())
}
