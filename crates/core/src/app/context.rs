//! The application context and its bootstrap state machine.
//!
//! One context is constructed at startup and injected everywhere -
//! there is no global. Initialization is an explicit state machine:
//! `Unauthenticated → Loading → Ready | Error`.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{error, info};

use konsern_shared::error::AppResult;
use konsern_shared::types::{GroupId, UserId};
use konsern_store::TableStore;

use crate::access::{AccessService, User, visible_companies};
use crate::budget::DeviationMode;
use crate::company::{Company, CompanyService, ComputedCompany, computed};
use crate::forecast::ForecastService;
use crate::reports::ReportLedger;

use super::activity::ActivityHandle;

/// Bootstrap phase of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppPhase {
    /// Nothing loaded yet; waiting for the identity check.
    Unauthenticated,
    /// Initial data load in flight.
    Loading,
    /// Serving.
    Ready,
    /// Initial load failed.
    Error(String),
}

impl AppPhase {
    /// Short name for health reporting.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error(_) => "error",
        }
    }
}

/// Everything the rest of the application needs, constructed once.
pub struct AppContext {
    group_id: GroupId,
    default_mode: DeviationMode,
    activity: ActivityHandle,
    companies: CompanyService,
    reports: ReportLedger,
    access: AccessService,
    forecasts: ForecastService,
    phase: RwLock<AppPhase>,
    company_cache: RwLock<Vec<Company>>,
    user_cache: RwLock<Vec<User>>,
}

impl AppContext {
    /// Builds the context over a storage backend.
    #[must_use]
    pub fn new(
        store: Arc<dyn TableStore>,
        group_id: GroupId,
        default_mode: DeviationMode,
    ) -> Arc<Self> {
        let activity = ActivityHandle::spawn(store.clone());
        Arc::new(Self {
            group_id,
            default_mode,
            activity: activity.clone(),
            companies: CompanyService::new(store.clone()),
            reports: ReportLedger::new(store.clone(), activity),
            access: AccessService::new(store.clone()),
            forecasts: ForecastService::new(store),
            phase: RwLock::new(AppPhase::Unauthenticated),
            company_cache: RwLock::new(Vec::new()),
            user_cache: RwLock::new(Vec::new()),
        })
    }

    /// The tenant this context serves.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Deviation display mode used when a request does not pick one.
    #[must_use]
    pub const fn default_mode(&self) -> DeviationMode {
        self.default_mode
    }

    /// The audit side channel.
    #[must_use]
    pub fn activity(&self) -> &ActivityHandle {
        &self.activity
    }

    /// Company persistence operations.
    #[must_use]
    pub fn companies(&self) -> &CompanyService {
        &self.companies
    }

    /// The report ledger.
    #[must_use]
    pub fn reports(&self) -> &ReportLedger {
        &self.reports
    }

    /// User directory and manager sync.
    #[must_use]
    pub fn access(&self) -> &AccessService {
        &self.access
    }

    /// Forecast operations.
    #[must_use]
    pub fn forecasts(&self) -> &ForecastService {
        &self.forecasts
    }

    /// Current bootstrap phase.
    pub async fn phase(&self) -> AppPhase {
        self.phase.read().await.clone()
    }

    /// Runs the bootstrap sequence: Loading, initial reload, then Ready
    /// or Error. Safe to call again after an Error to retry.
    pub async fn bootstrap(&self) {
        *self.phase.write().await = AppPhase::Loading;
        match self.reload().await {
            Ok(()) => {
                info!(group = %self.group_id, "bootstrap complete");
                *self.phase.write().await = AppPhase::Ready;
            }
            Err(err) => {
                error!(error = %err, "bootstrap failed");
                *self.phase.write().await = AppPhase::Error(err.to_string());
            }
        }
    }

    /// Re-runs the full reload-and-reconcile pipeline.
    ///
    /// On failure the caches keep their previous contents - a failed poll
    /// must not blank the dashboard.
    pub async fn reload(&self) -> AppResult<()> {
        let companies = self.companies.load_all(self.group_id).await?;
        let users = self.access.load_users(self.group_id).await?;

        *self.company_cache.write().await = companies;
        *self.user_cache.write().await = users;
        Ok(())
    }

    /// The cached, reconciled companies of the group.
    pub async fn cached_companies(&self) -> Vec<Company> {
        self.company_cache.read().await.clone()
    }

    /// The cached users of the group.
    pub async fn cached_users(&self) -> Vec<User> {
        self.user_cache.read().await.clone()
    }

    /// Looks up a cached user by id.
    pub async fn find_cached_user(&self, id: UserId) -> Option<User> {
        self.user_cache
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned()
    }

    /// The computed company rows `viewer` may see, derived fresh from the
    /// cache for the given reference point and mode.
    pub async fn computed_visible(
        &self,
        viewer: &User,
        on: NaiveDate,
        mode: DeviationMode,
    ) -> Vec<ComputedCompany> {
        visible_companies(viewer, self.cached_companies().await)
            .into_iter()
            .map(|company| computed(company, on, mode))
            .collect()
    }
}
