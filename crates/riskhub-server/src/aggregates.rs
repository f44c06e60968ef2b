//! Summary endpoints computed in memory from several tables

use crate::caller::{with_caller, Caller};
use crate::crud::{run, stamp, MAX_BODY_BYTES};
use crate::data::{self, RiskData};
use crate::error::ApiError;
use crate::state::{with_state, AppState};
use riskhub_core::dashboard::{self, DashboardSources};
use riskhub_core::{
    build_register, swot, tables, tows, to_row, GeneratedStrategy, RegisterRow, RegisterSources,
    SwotBulkReplace, SwotFactor, SwotFactorView,
};
use riskhub_store::{Filter, Query};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter as _, Reply};

/// Default number of factors per category paired by the generator
pub const DEFAULT_PER_CATEGORY: usize = 1;
/// Upper bound on factors per category paired by the generator
pub const MAX_PER_CATEGORY: usize = 5;

/// Mount the aggregate endpoints
pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let summary = warp::path!("api" / "swot-analisis" / "summary")
        .and(warp::get())
        .and(with_caller(state.clone()))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, params: HashMap<String, String>, state: AppState| async move {
            run(swot_summary(&state, &caller, &params)).await
        });

    let bulk = warp::path!("api" / "swot-analisis" / "bulk")
        .and(warp::post())
        .and(with_caller(state.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<SwotBulkReplace>())
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, body: SwotBulkReplace, state: AppState| async move {
            run(swot_bulk_replace(&state, &caller, body)).await
        });

    let overview = warp::path!("api" / "dashboard")
        .and(warp::get())
        .and(with_caller(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, state: AppState| async move {
            run(async move {
                let summary = dashboard_summary(&state, &caller).await?;
                Ok::<_, ApiError>(warp::reply::json(&summary))
            })
            .await
        });

    let register = warp::path!("api" / "risk-register")
        .and(warp::get())
        .and(with_caller(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, state: AppState| async move {
            run(async move {
                let rows = risk_register(&state, &caller).await?;
                Ok::<_, ApiError>(warp::reply::json(&rows))
            })
            .await
        });

    let generate = warp::path!("api" / "swot-tows" / "generate")
        .and(warp::post())
        .and(with_caller(state.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<GenerateRequest>())
        .and(with_state(state))
        .and_then(|caller: Caller, body: GenerateRequest, state: AppState| async move {
            run(generate_tows(&state, &caller, body)).await
        });

    summary
        .or(bulk)
        .unify()
        .or(overview)
        .unify()
        .or(register)
        .unify()
        .or(generate)
        .unify()
        .boxed()
}

fn uuid_param(params: &HashMap<String, String>, name: &str) -> Result<Option<Uuid>, ApiError> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| {
            Uuid::parse_str(v)
                .map_err(|_| ApiError::BadRequest(format!("{name} must be a uuid, got {v:?}")))
        })
        .transpose()
}

/// SWOT query filters: `tahun` as a year, the named columns as uuids
///
/// # Errors
/// [`ApiError::BadRequest`] for a malformed value.
pub(crate) fn swot_filters(
    params: &HashMap<String, String>,
    id_columns: &[&str],
) -> Result<Vec<Filter>, ApiError> {
    let mut filters = Vec::new();
    if let Some(tahun) = params.get("tahun").map(|v| v.trim()).filter(|v| !v.is_empty()) {
        let tahun: i32 = tahun
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("tahun must be a year, got {tahun:?}")))?;
        filters.push(Filter::eq("tahun", tahun));
    }
    for &name in id_columns {
        if let Some(id) = uuid_param(params, name)? {
            filters.push(Filter::eq(name, id.to_string()));
        }
    }
    Ok(filters)
}

async fn swot_summary(
    state: &AppState,
    caller: &Caller,
    params: &HashMap<String, String>,
) -> Result<impl Reply, ApiError> {
    let filters = swot_filters(params, &["unit_kerja_id", "rencana_strategis_id"])?;
    let factors = data::swot_factors(state, caller, filters).await?;
    Ok(warp::reply::json(&swot::summarize(&factors)))
}

/// Result of a bulk replacement
#[derive(Debug, Serialize)]
pub struct BulkReplaced {
    pub removed: usize,
    pub factors: Vec<SwotFactorView>,
}

/// Replace every factor of one (unit, year, category); the new bobot must total 100
async fn swot_bulk_replace(
    state: &AppState,
    caller: &Caller,
    body: SwotBulkReplace,
) -> Result<impl Reply, ApiError> {
    caller.require_write()?;
    let drafts = body.drafts()?;
    body.check_total()?;
    let org = caller.owning_org(None)?;

    let group = vec![
        match org {
            Some(org) => Filter::eq("organization_id", org.to_string()),
            None => Filter::is_null("organization_id"),
        },
        Filter::eq("unit_kerja_id", body.unit_kerja_id.to_string()),
        Filter::eq("tahun", body.tahun),
        Filter::eq("kategori", body.kategori.as_str()),
    ];
    let removed = state
        .store
        .select(
            tables::SWOT_ANALISIS,
            &Query::new().columns(&["id"]).filters(group.clone()),
        )
        .await?
        .len();
    if removed > 0 {
        state.store.delete(tables::SWOT_ANALISIS, &group).await?;
    }

    let mut rows = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let mut row = to_row(draft)?;
        stamp(&mut row, org);
        rows.push(row);
    }
    let inserted: Vec<SwotFactor> = riskhub_core::from_rows(
        state.store.insert(tables::SWOT_ANALISIS, rows).await?,
    )?;
    info!(
        unit_kerja_id = %body.unit_kerja_id,
        tahun = body.tahun,
        kategori = %body.kategori,
        removed,
        inserted = inserted.len(),
        "swot category replaced"
    );
    Ok(warp::reply::json(&BulkReplaced {
        removed,
        factors: inserted.into_iter().map(SwotFactor::present).collect(),
    }))
}

/// Dashboard for the caller's organization
///
/// # Errors
/// Store failure.
pub async fn dashboard_summary(
    state: &AppState,
    caller: &Caller,
) -> Result<dashboard::DashboardSummary, ApiError> {
    let (risk, kri, swot, work_units) = futures::try_join!(
        RiskData::load(state, caller),
        data::indicators(state, caller),
        data::swot_factors(state, caller, Vec::new()),
        state.work_units(),
    )?;
    Ok(dashboard::summarize(
        DashboardSources {
            risks: &risk.risks,
            inherent: &risk.inherent,
            residual: &risk.residual,
            monitoring: &risk.monitoring,
            kri: &kri,
            swot: &swot,
            work_units: &work_units,
        },
        state.today(),
    ))
}

/// Flattened register for the caller's organization
///
/// # Errors
/// Store failure.
pub async fn risk_register(state: &AppState, caller: &Caller) -> Result<Vec<RegisterRow>, ApiError> {
    let (risk, work_units, categories) = futures::try_join!(
        RiskData::load(state, caller),
        state.work_units(),
        state.risk_categories(),
    )?;
    Ok(build_register(
        RegisterSources {
            risks: &risk.risks,
            inherent: &risk.inherent,
            residual: &risk.residual,
            monitoring: &risk.monitoring,
            work_units: &work_units,
            categories: &categories,
        },
        state.today(),
    ))
}

/// Body of `POST /api/swot-tows/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub unit_kerja_id: Uuid,
    pub tahun: i32,
    #[serde(default)]
    pub rencana_strategis_id: Option<Uuid>,
    #[serde(default)]
    pub per_category: Option<usize>,
    #[serde(default)]
    pub persist: bool,
}

/// Generated strategies and how many were stored
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub strategies: Vec<GeneratedStrategy>,
    pub persisted: usize,
}

async fn generate_tows(
    state: &AppState,
    caller: &Caller,
    body: GenerateRequest,
) -> Result<impl Reply, ApiError> {
    if body.persist {
        caller.require_write()?;
    }
    let per_category = body
        .per_category
        .unwrap_or(DEFAULT_PER_CATEGORY)
        .clamp(1, MAX_PER_CATEGORY);
    let factors = data::swot_factors(
        state,
        caller,
        vec![
            Filter::eq("unit_kerja_id", body.unit_kerja_id.to_string()),
            Filter::eq("tahun", body.tahun),
        ],
    )
    .await?;
    let strategies = tows::generate(&factors, per_category);

    let mut persisted = 0;
    if body.persist && !strategies.is_empty() {
        let org = caller.owning_org(None)?;
        let mut rows = Vec::with_capacity(strategies.len());
        for strategy in &strategies {
            let draft = strategy.clone().into_draft(
                body.rencana_strategis_id,
                Some(body.unit_kerja_id),
                Some(body.tahun),
            );
            let mut row = to_row(&draft)?;
            stamp(&mut row, org);
            rows.push(row);
        }
        persisted = state.store.insert(tables::SWOT_TOWS, rows).await?.len();
        info!(
            unit_kerja_id = %body.unit_kerja_id,
            tahun = body.tahun,
            persisted,
            "tows strategies generated"
        );
    }
    Ok(warp::reply::json(&GenerateResponse {
        strategies,
        persisted,
    }))
}
