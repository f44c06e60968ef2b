//! Generic list / get / create / update / delete handlers
//!
//! `routes::<R>()` mounts the five operations of one [`Resource`] under
//! `/api/<R::PATH>`.

use crate::caller::{with_caller, Caller};
use crate::data::decode_rows;
use crate::error::ApiError;
use crate::resource::{Resource, Scope};
use crate::state::{with_state, AppState};
use chrono::Utc;
use riskhub_core::{from_row, to_row, Row, Validate};
use riskhub_store::{Filter, Query};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter as _, Rejection, Reply};

/// Largest accepted request body
pub const MAX_BODY_BYTES: u64 = 256 * 1024;

/// JSON request body as a loose row
pub fn json_body() -> impl warp::Filter<Extract = (Row,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json::<Row>())
}

/// Mount the CRUD operations of one resource
pub fn routes<R: Resource>(state: AppState) -> BoxedFilter<(Response,)> {
    let collection = warp::path("api").and(warp::path(R::PATH)).and(warp::path::end());
    let item = warp::path("api")
        .and(warp::path(R::PATH))
        .and(warp::path::param::<Uuid>())
        .and(warp::path::end());

    let list = collection
        .clone()
        .and(warp::get())
        .and(with_caller(state.clone()))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, params: HashMap<String, String>, state: AppState| async move {
            run(list::<R>(&state, &caller, &params)).await
        });

    let get = item
        .clone()
        .and(warp::get())
        .and(with_caller(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|id: Uuid, caller: Caller, state: AppState| async move {
            run(get::<R>(&state, &caller, id)).await
        });

    let create = collection
        .and(warp::post())
        .and(with_caller(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, body: Row, state: AppState| async move {
            run(create::<R>(&state, &caller, body)).await
        });

    let update = item
        .clone()
        .and(warp::put())
        .and(with_caller(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(|id: Uuid, caller: Caller, body: Row, state: AppState| async move {
            run(update::<R>(&state, &caller, id, body)).await
        });

    let delete = item
        .and(warp::delete())
        .and(with_caller(state.clone()))
        .and(with_state(state))
        .and_then(|id: Uuid, caller: Caller, state: AppState| async move {
            run(delete::<R>(&state, &caller, id)).await
        });

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

/// Await a handler and turn its error into a rejection
pub async fn run<F, T>(handler: F) -> Result<Response, Rejection>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
    T: Reply,
{
    handler
        .await
        .map(Reply::into_response)
        .map_err(warp::reject::custom)
}

/// Set `organization_id` and `created_at` on a row about to be inserted
pub fn stamp(row: &mut Row, org: Option<Uuid>) {
    row.insert(
        "organization_id".into(),
        org.map_or(Value::Null, |o| Value::String(o.to_string())),
    );
    row.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
}

/// Filters limiting a resource to what the caller may see
fn scope_filters<R: Resource>(caller: &Caller) -> Result<Vec<Filter>, ApiError> {
    match R::SCOPE {
        Scope::Organization => caller.org_filters(),
        Scope::Global => Ok(Vec::new()),
    }
}

fn require_permission<R: Resource>(caller: &Caller, deleting: bool) -> Result<(), ApiError> {
    if deleting {
        caller.require_delete()?;
    } else {
        caller.require_write()?;
    }
    if R::SCOPE == Scope::Global {
        caller.require_master()?;
    }
    Ok(())
}

fn parse_draft<R: Resource>(body: Row) -> Result<R::Draft, ApiError> {
    let draft: R::Draft = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::BadRequest(format!("invalid {} body: {e}", R::PATH)))?;
    draft.validate()?;
    Ok(draft)
}

fn present_row<R: Resource>(state: &AppState, row: Row) -> Result<R::View, ApiError> {
    let record: R::Record = from_row(row)?;
    Ok(R::present(record, state.today()))
}

async fn find<R: Resource>(state: &AppState, caller: &Caller, id: Uuid) -> Result<Row, ApiError> {
    let query = Query::new()
        .filters(scope_filters::<R>(caller)?)
        .eq("id", id.to_string())
        .limit(1);
    state
        .store
        .select(R::TABLE, &query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found(format!("{} {id}", R::PATH)))
}

async fn list<R: Resource>(
    state: &AppState,
    caller: &Caller,
    params: &HashMap<String, String>,
) -> Result<impl Reply, ApiError> {
    let mut query = Query::new().filters(scope_filters::<R>(caller)?);
    for column in R::FILTERS {
        if let Some(value) = params.get(*column).filter(|v| !v.trim().is_empty()) {
            query = query.eq(column, value.trim());
        }
    }
    let (column, ascending) = R::ORDER;
    query = if ascending {
        query.order_asc(column)
    } else {
        query.order_desc(column)
    };

    let rows = match R::SCOPE {
        Scope::Global => {
            let cached = state
                .lookups
                .rows(state.store.as_ref(), R::TABLE, column)
                .await?;
            cached.iter().filter(|r| query.matches(r)).cloned().collect()
        }
        Scope::Organization => state.store.select(R::TABLE, &query).await?,
    };

    let today = state.today();
    let views: Vec<R::View> = decode_rows::<R::Record>(R::TABLE, rows)
        .into_iter()
        .map(|record| R::present(record, today))
        .collect();
    Ok(warp::reply::json(&views))
}

async fn get<R: Resource>(state: &AppState, caller: &Caller, id: Uuid) -> Result<impl Reply, ApiError> {
    let row = find::<R>(state, caller, id).await?;
    Ok(warp::reply::json(&present_row::<R>(state, row)?))
}

async fn create<R: Resource>(state: &AppState, caller: &Caller, body: Row) -> Result<impl Reply, ApiError> {
    require_permission::<R>(caller, false)?;
    let requested_org = body
        .get("organization_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());
    let draft = parse_draft::<R>(body)?;

    let mut row = to_row(&draft)?;
    let org = match R::SCOPE {
        Scope::Organization => {
            let org = caller.owning_org(requested_org)?;
            stamp(&mut row, org);
            org
        }
        Scope::Global => None,
    };
    R::before_write(state, caller, org, None, &draft).await?;

    let inserted = state
        .store
        .insert(R::TABLE, vec![row])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal(format!("insert into {} returned no row", R::TABLE)))?;
    if R::SCOPE == Scope::Global {
        state.lookups.invalidate(R::TABLE).await;
    }
    info!(
        resource = R::PATH,
        id = ?inserted.get("id"),
        user_id = %caller.user_id,
        "row created"
    );
    Ok(warp::reply::with_status(
        warp::reply::json(&present_row::<R>(state, inserted)?),
        StatusCode::CREATED,
    ))
}

async fn update<R: Resource>(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    body: Row,
) -> Result<impl Reply, ApiError> {
    require_permission::<R>(caller, false)?;
    let draft = parse_draft::<R>(body)?;
    let existing = find::<R>(state, caller, id).await?;
    let org = existing
        .get("organization_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());
    R::before_write(state, caller, org, Some(id), &draft).await?;

    let mut filters = scope_filters::<R>(caller)?;
    filters.push(Filter::eq("id", id.to_string()));
    let updated = state
        .store
        .update(R::TABLE, &filters, to_row(&draft)?)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found(format!("{} {id}", R::PATH)))?;
    if R::SCOPE == Scope::Global {
        state.lookups.invalidate(R::TABLE).await;
    }
    info!(resource = R::PATH, %id, user_id = %caller.user_id, "row updated");
    Ok(warp::reply::json(&present_row::<R>(state, updated)?))
}

async fn delete<R: Resource>(state: &AppState, caller: &Caller, id: Uuid) -> Result<impl Reply, ApiError> {
    require_permission::<R>(caller, true)?;
    find::<R>(state, caller, id).await?;

    let mut filters = scope_filters::<R>(caller)?;
    filters.push(Filter::eq("id", id.to_string()));
    if let Err(e) = state.store.delete(R::TABLE, &filters).await {
        warn!(resource = R::PATH, %id, error = %e, "delete failed");
        return Err(e.into());
    }
    if R::SCOPE == Scope::Global {
        state.lookups.invalidate(R::TABLE).await;
    }
    info!(resource = R::PATH, %id, user_id = %caller.user_id, "row deleted");
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

/// Delete one row on behalf of a page form; same checks as the API
///
/// # Errors
/// As `DELETE /api/<resource>/<id>`.
pub async fn delete_for_page<R: Resource>(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> Result<(), ApiError> {
    delete::<R>(state, caller, id).await.map(|_| ())
}
