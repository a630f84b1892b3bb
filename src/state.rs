// Application state: single writer, snapshot readers.
// Writers go through StateStore::update; every update publishes a fresh snapshot
// on a watch channel. Error banners are also broadcast as transient notices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::time::Duration;

use crate::error::DashboardError;
use crate::models::{Alert, Farm, FarmId, Sensor, SoilData, User, WeatherSnapshot};

/// Which top-level view a client should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Unauthenticated,
    Dashboard,
}

/// User-visible error message, auto-dismissed after `dismiss_after_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBanner {
    pub id: u64,
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub dismiss_after_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    Error(ErrorBanner),
    SessionExpired,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub farms: Vec<Farm>,
    pub current_farm_id: Option<FarmId>,
    pub sensors: Vec<Sensor>,
    pub soil: SoilData,
    pub weather: Option<WeatherSnapshot>,
    pub alerts: Vec<Alert>,
    pub is_loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub user: Option<User>,
    pub view: View,
    pub error: Option<ErrorBanner>,
}

impl ApplicationState {
    pub fn current_farm(&self) -> Option<&Farm> {
        let id = self.current_farm_id.as_ref()?;
        self.farms.iter().find(|f| &f.id == id)
    }

    /// Replace the farm list wholesale. Keeps the selection when it is still listed,
    /// otherwise selects the first farm (or none). Returns the farm newly selected.
    pub fn set_farms(&mut self, farms: Vec<Farm>) -> Option<FarmId> {
        self.farms = farms;
        let still_listed = self
            .current_farm_id
            .as_ref()
            .is_some_and(|id| self.farms.iter().any(|f| &f.id == id));
        if still_listed {
            return None;
        }
        let next = self.farms.first().map(|f| f.id.clone());
        self.current_farm_id = next.clone();
        self.clear_farm_detail();
        next
    }

    /// Select a listed farm. Detail data of the previous farm is dropped.
    pub fn select_farm(&mut self, id: &FarmId) -> Result<(), DashboardError> {
        if !self.farms.iter().any(|f| &f.id == id) {
            return Err(DashboardError::UnknownFarm(id.clone()));
        }
        if self.current_farm_id.as_ref() != Some(id) {
            self.current_farm_id = Some(id.clone());
            self.clear_farm_detail();
        }
        Ok(())
    }

    fn clear_farm_detail(&mut self) {
        self.sensors.clear();
        self.soil = SoilData::default();
        self.weather = None;
        self.alerts.clear();
    }
}

pub struct StateStore {
    state: Mutex<ApplicationState>,
    tx: watch::Sender<ApplicationState>,
    notices: broadcast::Sender<Notice>,
    in_flight: AtomicUsize,
    banner_seq: AtomicU64,
    banner_ttl: Duration,
}

/// Clears the loading flag when the last in-flight fetch sequence ends (any path).
pub struct LoadingGuard<'a>(&'a StateStore);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let remaining = self.0.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        self.0.update(|s| s.is_loading = remaining > 0);
    }
}

impl StateStore {
    pub fn new(banner_ttl: Duration, notice_capacity: usize) -> Self {
        let (tx, _) = watch::channel(ApplicationState::default());
        let (notices, _) = broadcast::channel(notice_capacity.max(1));
        Self {
            state: Mutex::new(ApplicationState::default()),
            tx,
            notices,
            in_flight: AtomicUsize::new(0),
            banner_seq: AtomicU64::new(0),
            banner_ttl,
        }
    }

    pub fn snapshot(&self) -> ApplicationState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApplicationState> {
        self.tx.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Mutate the state and publish the result to all subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut ApplicationState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut state);
        self.tx.send_replace(state.clone());
        out
    }

    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.update(|s| s.is_loading = true);
        LoadingGuard(self)
    }

    /// Back to the initial (unauthenticated) state.
    pub fn reset(&self) {
        self.update(|s| {
            let is_loading = s.is_loading;
            *s = ApplicationState {
                is_loading,
                ..ApplicationState::default()
            };
        });
    }

    pub fn notify(&self, notice: Notice) {
        if self.notices.send(notice).is_err() {
            tracing::debug!(operation = "notify", "no notice subscribers");
        }
    }

    /// Show an error banner; it is cleared after the banner TTL unless a newer one replaced it.
    pub fn raise_error(self: &Arc<Self>, message: impl Into<String>) -> u64 {
        let id = self.banner_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let banner = ErrorBanner {
            id,
            message: message.into(),
            raised_at: Utc::now(),
            dismiss_after_ms: self.banner_ttl.as_millis() as u64,
        };
        tracing::warn!(banner_id = id, message = %banner.message, "error banner raised");
        self.update(|s| s.error = Some(banner.clone()));
        self.notify(Notice::Error(banner));

        let store = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(store.banner_ttl).await;
            store.dismiss_error(id);
        });
        id
    }

    /// Clears the banner only if it is still the one with `id`.
    pub fn dismiss_error(&self, id: u64) {
        self.update(|s| {
            if s.error.as_ref().is_some_and(|b| b.id == id) {
                s.error = None;
            }
        });
    }
}
