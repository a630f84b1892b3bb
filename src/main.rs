use anyhow::Result;
use farmeye::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!("{} {} starting", version::NAME, version::VERSION);

    let gateway: Arc<dyn gateway::FarmGateway> = Arc::new(gateway::HttpGateway::new(
        &app_config.api.endpoint,
        Duration::from_secs(app_config.api.request_timeout_secs),
    )?);
    let session: Arc<dyn session::SessionStore> =
        Arc::new(session::SqliteSessionStore::connect(&app_config.session.path).await?);
    let store = Arc::new(state::StateStore::new(
        Duration::from_millis(app_config.refresh.error_banner_ms),
        app_config.publishing.broadcast_capacity,
    ));
    let dashboard = Arc::new(dashboard::Dashboard::new(gateway, session, store));

    let view = dashboard.start().await;
    tracing::info!(view = ?view, "initial view");

    let (command_tx, command_rx) = mpsc::channel(worker::COMMAND_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            dashboard: dashboard.clone(),
            commands: command_rx,
            shutdown_rx,
        },
        worker::WorkerConfig {
            refresh_interval_ms: app_config.refresh.interval_ms,
        },
    );

    let app = routes::app(dashboard, command_tx, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = shutdown_signal() => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
