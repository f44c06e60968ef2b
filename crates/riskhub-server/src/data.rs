//! Row loading shared by the API, the pages and the reports

use crate::caller::Caller;
use crate::error::ApiError;
use crate::state::AppState;
use riskhub_core::{
    from_row, tables, KeyRiskIndicator, RencanaStrategis, RiskAnalysis, RiskInput,
    RiskMonitoring, Row, SwotFactor, TowsStrategy,
};
use riskhub_store::{Filter, Query};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode rows, skipping (and logging) any that do not fit the record type
///
/// Legacy tables hold rows written by older tools; one malformed row must
/// not hide every other row of a listing.
pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned();
            match from_row::<T>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(table, id = ?id, error = %e, "skipping undecodable row");
                    None
                }
            }
        })
        .collect();
    if decoded.len() < total {
        warn!(table, skipped = total - decoded.len(), "rows skipped while decoding");
    }
    decoded
}

/// Select and decode the caller-visible rows of an organization table
///
/// # Errors
/// Store failure, or a caller without organization.
pub async fn load<T: DeserializeOwned>(
    state: &AppState,
    caller: &Caller,
    table: &str,
    extra: Vec<Filter>,
) -> Result<Vec<T>, ApiError> {
    let query = Query::new()
        .filters(caller.org_filters()?)
        .filters(extra)
        .order_desc("created_at");
    let rows = state.store.select(table, &query).await?;
    Ok(decode_rows(table, rows))
}

/// Everything the risk screens read
#[derive(Debug, Clone, Default)]
pub struct RiskData {
    pub risks: Vec<RiskInput>,
    pub inherent: Vec<RiskAnalysis>,
    pub residual: Vec<RiskAnalysis>,
    pub monitoring: Vec<RiskMonitoring>,
}

impl RiskData {
    /// Load the four risk tables concurrently
    ///
    /// # Errors
    /// First store failure.
    pub async fn load(state: &AppState, caller: &Caller) -> Result<Self, ApiError> {
        let (risks, inherent, residual, monitoring) = futures::try_join!(
            load::<RiskInput>(state, caller, tables::RISK_INPUTS, Vec::new()),
            load::<RiskAnalysis>(state, caller, tables::RISK_INHERENT, Vec::new()),
            load::<RiskAnalysis>(state, caller, tables::RISK_RESIDUAL, Vec::new()),
            load::<RiskMonitoring>(state, caller, tables::RISK_MONITORING, Vec::new()),
        )?;
        Ok(Self {
            risks,
            inherent,
            residual,
            monitoring,
        })
    }
}

/// SWOT factors, optionally narrowed by equality filters
///
/// # Errors
/// Store failure.
pub async fn swot_factors(
    state: &AppState,
    caller: &Caller,
    extra: Vec<Filter>,
) -> Result<Vec<SwotFactor>, ApiError> {
    load(state, caller, tables::SWOT_ANALISIS, extra).await
}

/// Key risk indicators
///
/// # Errors
/// Store failure.
pub async fn indicators(state: &AppState, caller: &Caller) -> Result<Vec<KeyRiskIndicator>, ApiError> {
    load(state, caller, tables::KEY_RISK_INDICATOR, Vec::new()).await
}

/// Strategic plans
///
/// # Errors
/// Store failure.
pub async fn plans(state: &AppState, caller: &Caller) -> Result<Vec<RencanaStrategis>, ApiError> {
    load(state, caller, tables::RENCANA_STRATEGIS, Vec::new()).await
}

/// TOWS strategies
///
/// # Errors
/// Store failure.
pub async fn strategies(state: &AppState, caller: &Caller) -> Result<Vec<TowsStrategy>, ApiError> {
    load(state, caller, tables::SWOT_TOWS, Vec::new()).await
}
