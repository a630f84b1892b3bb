// Refresh cycle: re-fetch one farm's sensors, soil and weather, derive alerts, publish.
//
// The three fetches run concurrently and are joined before anything is written.
// Each slice degrades on its own (sensors -> empty, soil -> empty, weather -> absent).
// Overlapping refreshes are allowed; each takes a sequence number and a result older
// than the last applied one is dropped.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument, warn};

use crate::alerts::derive_alerts;
use crate::error::GatewayError;
use crate::gateway::FarmGateway;
use crate::models::FarmId;
use crate::session::SessionStore;
use crate::state::{Notice, StateStore, View};

pub const FARM_DETAIL_ERROR: &str = "Failed to load detailed farm data. Please try again later.";

/// One independently fetched part of a farm's detail data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Sensors,
    Soil,
    Weather,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// State updated; `degraded` lists slices that fell back to empty.
    Applied { seq: u64, degraded: Vec<Slice> },
    /// A newer refresh already landed, or the farm is no longer selected.
    Superseded { seq: u64 },
    /// Network unreachable for every slice; previous snapshot kept.
    Failed { seq: u64 },
    /// No token, or the API refused the token on every slice. No state written besides the view.
    Unauthenticated,
}

pub struct RefreshCycle {
    gateway: Arc<dyn FarmGateway>,
    session: Arc<dyn SessionStore>,
    store: Arc<StateStore>,
    issued: AtomicU64,
    /// Written only inside `StateStore::update`, so check-and-set is serialized.
    applied: AtomicU64,
}

impl RefreshCycle {
    pub fn new(
        gateway: Arc<dyn FarmGateway>,
        session: Arc<dyn SessionStore>,
        store: Arc<StateStore>,
    ) -> Self {
        Self {
            gateway,
            session,
            store,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    #[instrument(skip(self, farm_id), fields(farm_id = %farm_id))]
    pub async fn refresh(&self, farm_id: &FarmId) -> RefreshOutcome {
        let token = match self.session.token().await {
            Ok(Some(t)) => t,
            Ok(None) => {
                debug!(operation = "refresh", "no session token; refresh skipped");
                return RefreshOutcome::Unauthenticated;
            }
            Err(e) => {
                warn!(error = %e, operation = "read_token", "session store failed");
                let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
                self.store.raise_error(FARM_DETAIL_ERROR);
                return RefreshOutcome::Failed { seq };
            }
        };

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = self.store.begin_loading();

        let (sensors, soil, weather) = tokio::join!(
            self.gateway.farm_sensors(&token, farm_id),
            self.gateway.farm_soil(&token, farm_id),
            self.gateway.farm_weather(&token, farm_id),
        );

        let errors = [sensors.as_ref().err(), soil.as_ref().err(), weather.as_ref().err()];
        // A 401/403 on one slice only degrades it; the session is dropped when
        // the token is refused on every slice.
        if errors.iter().all(|e| e.is_some_and(GatewayError::is_token_rejected)) {
            warn!(seq, operation = "refresh", "session rejected by api");
            self.expire_session().await;
            return RefreshOutcome::Unauthenticated;
        }
        if errors.iter().all(|e| e.is_some_and(GatewayError::is_transport)) {
            warn!(seq, operation = "refresh", "api unreachable; keeping previous data");
            self.store.raise_error(FARM_DETAIL_ERROR);
            return RefreshOutcome::Failed { seq };
        }

        let mut degraded = Vec::new();
        let sensors = sensors.unwrap_or_else(|e| {
            warn!(seq, error = %e, operation = "farm_sensors", "sensors unavailable this cycle");
            degraded.push(Slice::Sensors);
            Vec::new()
        });
        let soil = soil.unwrap_or_else(|e| {
            warn!(seq, error = %e, operation = "farm_soil", "soil data unavailable this cycle");
            degraded.push(Slice::Soil);
            Default::default()
        });
        let weather = match weather {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(seq, error = %e, operation = "farm_weather", "weather unavailable this cycle");
                degraded.push(Slice::Weather);
                None
            }
        };

        let now = Utc::now();
        let applied = self.store.update(|s| {
            let stale = seq <= self.applied.load(Ordering::SeqCst)
                || s.view != View::Dashboard
                || s.current_farm_id.as_ref() != Some(farm_id);
            if stale {
                return false;
            }
            self.applied.store(seq, Ordering::SeqCst);
            s.sensors = sensors;
            s.soil = soil;
            s.weather = weather;
            s.last_updated = Some(now);
            s.alerts = derive_alerts(s, now);
            true
        });

        if applied {
            debug!(seq, degraded = ?degraded, "farm data refreshed");
            RefreshOutcome::Applied { seq, degraded }
        } else {
            debug!(seq, "refresh result superseded; dropped");
            RefreshOutcome::Superseded { seq }
        }
    }

    /// Token rejected: forget it and route clients to the login view.
    pub async fn expire_session(&self) {
        if let Err(e) = self.session.clear_token().await {
            warn!(error = %e, operation = "clear_token", "failed to clear session token");
        }
        self.store.reset();
        self.store.notify(Notice::SessionExpired);
    }
}
