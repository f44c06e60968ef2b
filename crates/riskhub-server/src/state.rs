//! Shared application state handed to every filter

use crate::cache::LookupCache;
use crate::config::ServerConfig;
use crate::data::decode_rows;
use crate::error::ApiError;
use chrono::{NaiveDate, Utc};
use riskhub_core::{tables, RiskCategory, WorkUnit};
use riskhub_store::{AuthProvider, RowStore};
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Collaborators and settings; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub config: Arc<ServerConfig>,
    pub lookups: LookupCache,
    fixed_today: Option<NaiveDate>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("fixed_today", &self.fixed_today)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state from collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn RowStore>,
        auth: Arc<dyn AuthProvider>,
        config: ServerConfig,
    ) -> Self {
        Self {
            store,
            auth,
            lookups: LookupCache::with_ttl(config.lookup_ttl),
            config: Arc::new(config),
            fixed_today: None,
        }
    }

    /// Pin the date used for overdue checks and report stamps
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Current date
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Cached work units, ordered by name; unreadable rows are skipped
    ///
    /// # Errors
    /// Store failure.
    pub async fn work_units(&self) -> Result<Vec<WorkUnit>, ApiError> {
        let rows = self
            .lookups
            .rows(self.store.as_ref(), tables::WORK_UNITS, "name")
            .await?;
        Ok(decode_rows(tables::WORK_UNITS, rows.as_ref().clone()))
    }

    /// Cached risk categories, ordered by name; unreadable rows are skipped
    ///
    /// # Errors
    /// Store failure.
    pub async fn risk_categories(&self) -> Result<Vec<RiskCategory>, ApiError> {
        let rows = self
            .lookups
            .rows(self.store.as_ref(), tables::RISK_CATEGORIES, "name")
            .await?;
        Ok(decode_rows(tables::RISK_CATEGORIES, rows.as_ref().clone()))
    }
}

/// Filter injecting a clone of the state
pub fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
