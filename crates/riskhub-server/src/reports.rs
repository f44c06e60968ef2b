//! Report downloads: `GET /api/reports/<name>/<format>`

use crate::aggregates::{risk_register, swot_filters};
use crate::caller::{with_caller, Caller};
use crate::crud::run;
use crate::data::{self, RiskData};
use crate::error::ApiError;
use crate::state::{with_state, AppState};
use riskhub_report::template::{KRI, MONITORING, RISK_REGISTER, SWOT};
use riskhub_report::{rows, RenderedReport, ReportFormat, ReportTable, ReportTemplate};
use std::collections::HashMap;
use tracing::info;
use warp::filters::BoxedFilter;
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use warp::reply::Response;
use warp::Filter as _;

/// Mount the report route
pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "reports" / String / String)
        .and(warp::get())
        .and(with_caller(state.clone()))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state))
        .and_then(
            |name: String,
             format: String,
             caller: Caller,
             params: HashMap<String, String>,
             state: AppState| async move {
                run(download(state, caller, name, format, params)).await
            },
        )
        .boxed()
}

async fn download(
    state: AppState,
    caller: Caller,
    name: String,
    format: String,
    params: HashMap<String, String>,
) -> Result<warp::http::Response<Vec<u8>>, ApiError> {
    let template = ReportTemplate::by_name(&name)?;
    let format: ReportFormat = format.parse()?;
    let table = build_table(&state, &caller, template, &params).await?;
    let rows = table.rows.len();

    let report = tokio::task::spawn_blocking(move || riskhub_report::render(&table, format))
        .await
        .map_err(|e| ApiError::Internal(format!("report task failed: {e}")))??;
    info!(
        report = template.name,
        %format,
        rows,
        bytes = report.bytes.len(),
        user_id = %caller.user_id,
        "report rendered"
    );
    attachment(report)
}

/// Wrap rendered bytes as a file download
///
/// # Errors
/// Only if the filename cannot be used as a header value.
pub fn attachment(report: RenderedReport) -> Result<warp::http::Response<Vec<u8>>, ApiError> {
    warp::http::Response::builder()
        .header(CONTENT_TYPE, report.content_type)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        )
        .body(report.bytes)
        .map_err(|e| ApiError::Internal(format!("building download response: {e}")))
}

/// Fetch the rows of one report for the caller's organization
///
/// The SWOT report accepts `tahun` and `unit_kerja_id` query parameters.
///
/// # Errors
/// Malformed `tahun` / `unit_kerja_id` (400) or store failure.
pub async fn build_table(
    state: &AppState,
    caller: &Caller,
    template: &'static ReportTemplate,
    params: &HashMap<String, String>,
) -> Result<ReportTable, ApiError> {
    let cells = match template.name {
        name if name == RISK_REGISTER.name => rows::risk_register(&risk_register(state, caller).await?),
        name if name == SWOT.name => {
            let filters = swot_filters(params, &["unit_kerja_id"])?;
            let (factors, work_units) = futures::try_join!(
                data::swot_factors(state, caller, filters),
                state.work_units(),
            )?;
            rows::swot(&factors, &work_units)
        }
        name if name == KRI.name => rows::kri(&data::indicators(state, caller).await?),
        name if name == MONITORING.name => {
            let risk = RiskData::load(state, caller).await?;
            rows::monitoring(&risk.monitoring, &risk.risks, state.today())
        }
        other => return Err(ApiError::not_found(format!("report {other}"))),
    };
    Ok(ReportTable::new(template, state.config.org_name.clone(), state.today()).with_rows(cells))
}
