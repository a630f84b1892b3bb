// Background refresh worker: periodic timer + command dispatch.
// Every refresh and command runs as its own task, so a manual refresh can overlap a
// timer refresh; RefreshCycle sequence numbers decide which result is kept.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, interval_at};
use tracing::Instrument;

use crate::dashboard::{Command, Dashboard};
use crate::state::View;

/// Commands buffered between the HTTP/WS surface and the worker.
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

pub struct WorkerDeps {
    pub dashboard: Arc<Dashboard>,
    pub commands: mpsc::Receiver<Command>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    pub refresh_interval_ms: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        dashboard,
        mut commands,
        mut shutdown_rx,
    } = deps;
    let period = Duration::from_millis(config.refresh_interval_ms);

    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "refresh_worker",
        refresh_interval_ms = config.refresh_interval_ms
    );

    tokio::spawn(async move {
        // First tick one period out: startup already loaded the selected farm.
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let state = dashboard.store().snapshot();
                    if state.view != View::Dashboard {
                        tracing::debug!(operation = "tick", "not authenticated; tick skipped");
                        continue;
                    }
                    let Some(farm_id) = state.current_farm_id else {
                        tracing::debug!(operation = "tick", "no farm selected; tick skipped");
                        continue;
                    };
                    let cycle = dashboard.refresh_cycle().clone();
                    tokio::spawn(async move {
                        cycle.refresh(&farm_id).await;
                    });
                }
                Some(command) = commands.recv() => {
                    tracing::debug!(operation = "dispatch", command = ?command, "command received");
                    let dashboard = dashboard.clone();
                    tokio::spawn(async move {
                        if let Err(e) = dashboard.dispatch(command).await {
                            tracing::warn!(error = %e, operation = "dispatch", "command failed");
                        }
                    });
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Refresh worker shutting down");
                    break;
                }
            }
        }
    }
    .instrument(worker_span))
}
