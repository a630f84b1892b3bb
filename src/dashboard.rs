// Dashboard controller: command handlers over the state store.
// Startup auth check, login/logout, farm list, farm selection, manual refresh.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{AuthError, DashboardError};
use crate::gateway::FarmGateway;
use crate::models::{Credentials, FarmId, User};
use crate::refresh::{RefreshCycle, RefreshOutcome};
use crate::session::{Authenticator, SessionStore};
use crate::state::{StateStore, View};

pub const FARMS_ERROR: &str = "Failed to load farm data. Please try again later.";
pub const LOGIN_ERROR: &str = "Login failed. Please check your credentials and try again.";

/// UI-agnostic commands, e.g. `{"command":"selectFarm","farmId":"f1"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    Login(Credentials),
    Logout,
    LoadFarms,
    SelectFarm {
        #[serde(rename = "farmId")]
        farm_id: FarmId,
    },
    Refresh,
}

pub struct Dashboard {
    auth: Authenticator,
    gateway: Arc<dyn FarmGateway>,
    session: Arc<dyn SessionStore>,
    store: Arc<StateStore>,
    refresh: Arc<RefreshCycle>,
}

impl Dashboard {
    pub fn new(
        gateway: Arc<dyn FarmGateway>,
        session: Arc<dyn SessionStore>,
        store: Arc<StateStore>,
    ) -> Self {
        let refresh = Arc::new(RefreshCycle::new(
            gateway.clone(),
            session.clone(),
            store.clone(),
        ));
        Self {
            auth: Authenticator::new(gateway.clone(), session.clone()),
            gateway,
            session,
            store,
            refresh,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn refresh_cycle(&self) -> &Arc<RefreshCycle> {
        &self.refresh
    }

    /// Validate the stored session and return the resulting view. Without a valid
    /// token the dashboard stays on the login view and nothing is fetched.
    #[instrument(skip(self), fields(operation = "start"))]
    pub async fn start(&self) -> View {
        match self.auth.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "session valid");
                self.enter_dashboard(user).await;
                // Loading farms may still expire the session.
                self.store.snapshot().view
            }
            Err(e) => {
                info!(reason = %e, "no valid session; showing login");
                self.store.update(|s| {
                    s.view = View::Unauthenticated;
                    s.user = None;
                });
                View::Unauthenticated
            }
        }
    }

    pub async fn dispatch(&self, command: Command) -> Result<(), DashboardError> {
        match command {
            Command::Login(credentials) => self.login(&credentials).await.map(|_| ()),
            Command::Logout => {
                self.logout().await;
                Ok(())
            }
            Command::LoadFarms => self.load_farms().await.map(|_| ()),
            Command::SelectFarm { farm_id } => self.select_farm(&farm_id).await.map(|_| ()),
            Command::Refresh => self.refresh_current().await.map(|_| ()),
        }
    }

    #[instrument(skip(self, credentials), fields(operation = "login", username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User, DashboardError> {
        let result = {
            let _loading = self.store.begin_loading();
            self.auth.login(credentials).await
        };
        match result {
            Ok(user) => {
                self.enter_dashboard(user.clone()).await;
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.store.raise_error(LOGIN_ERROR);
                Err(e.into())
            }
        }
    }

    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            warn!(error = %e, operation = "logout", "failed to clear session token");
        }
        self.store.reset();
    }

    /// Replace the farm list; when this selects a farm, its data is refreshed.
    #[instrument(skip(self), fields(operation = "load_farms"))]
    pub async fn load_farms(&self) -> Result<Option<FarmId>, DashboardError> {
        let token = self
            .session
            .token()
            .await
            .map_err(AuthError::from)?
            .ok_or(DashboardError::NotAuthenticated)?;

        let _loading = self.store.begin_loading();
        match self.gateway.list_farms(&token).await {
            Ok(farms) => {
                let count = farms.len();
                let selected = self.store.update(|s| s.set_farms(farms));
                info!(farms = count, selected = ?selected, "farms loaded");
                if let Some(id) = &selected {
                    self.refresh.refresh(id).await;
                }
                Ok(selected)
            }
            Err(e) if e.is_unauthorized() => {
                self.refresh.expire_session().await;
                Err(AuthError::Rejected.into())
            }
            Err(e) => {
                warn!(error = %e, "failed to load farms");
                self.store.raise_error(FARMS_ERROR);
                Err(e.into())
            }
        }
    }

    pub async fn select_farm(&self, farm_id: &FarmId) -> Result<RefreshOutcome, DashboardError> {
        self.require_dashboard()?;
        self.store.update(|s| s.select_farm(farm_id))?;
        Ok(self.refresh.refresh(farm_id).await)
    }

    /// Manual trigger: refresh the selected farm now.
    pub async fn refresh_current(&self) -> Result<RefreshOutcome, DashboardError> {
        self.require_dashboard()?;
        let farm_id = self
            .store
            .snapshot()
            .current_farm_id
            .ok_or(DashboardError::NoFarmSelected)?;
        Ok(self.refresh.refresh(&farm_id).await)
    }

    fn require_dashboard(&self) -> Result<(), DashboardError> {
        if self.store.snapshot().view == View::Dashboard {
            Ok(())
        } else {
            Err(DashboardError::NotAuthenticated)
        }
    }

    async fn enter_dashboard(&self, user: User) {
        self.store.update(|s| {
            s.view = View::Dashboard;
            s.user = Some(user);
        });
        if let Err(e) = self.load_farms().await {
            warn!(error = %e, operation = "enter_dashboard", "initial farm load failed");
        }
    }
}
