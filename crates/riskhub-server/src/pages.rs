//! Browser screens under `/app`, plus the login and logout forms
//!
//! Pages authenticate with the session cookie and redirect to `/login`
//! when it is missing or stale. Row actions post a form and redirect back.

use crate::aggregates::{dashboard_summary, risk_register};
use crate::caller::{access_token, with_page_caller, Caller, SESSION_COOKIE};
use crate::crud::{delete_for_page, run, MAX_BODY_BYTES};
use crate::data;
use crate::error::ApiError;
use crate::resource::{Indicators, Resource, Risks, StrategicPlans, SwotFactors};
use crate::state::{with_state, AppState};
use crate::views::{self, Frame, Screen};
use riskhub_core::{swot, KeyRiskIndicator, RencanaStrategis, SwotFactor};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::http::header::{LOCATION, SET_COOKIE};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter as _, Reply};

fn frame(caller: &Caller) -> Frame<'_> {
    Frame {
        user: caller.display_name(),
        can_delete: caller.role.can_delete(),
    }
}

fn see_other(location: &str, cookie: Option<String>) -> Result<Response, ApiError> {
    let mut builder = warp::http::Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(LOCATION, location);
    if let Some(cookie) = cookie {
        builder = builder.header(SET_COOKIE, cookie);
    }
    builder
        .body(warp::hyper::Body::empty())
        .map_err(|e| ApiError::Internal(format!("building redirect: {e}")))
}

fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Mount every page route
pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let root = warp::path::end()
        .and(warp::get())
        .and_then(|| async { run(async { see_other("/app/dashboard", None) }).await });

    let login_form = warp::path!("login")
        .and(warp::get())
        .map(|| warp::reply::html(views::login(None)).into_response());

    let login = warp::path!("login")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(|form: HashMap<String, String>, state: AppState| async move {
            run(sign_in(state, form)).await
        });

    let logout = warp::path!("logout")
        .and(warp::post())
        .and(access_token())
        .and(with_state(state.clone()))
        .and_then(|token: Option<String>, state: AppState| async move {
            run(sign_out(state, token)).await
        });

    root.or(login_form)
        .unify()
        .or(login)
        .unify()
        .or(logout)
        .unify()
        .or(screen_route(state.clone(), Screen::Dashboard))
        .unify()
        .or(screen_route(state.clone(), Screen::Risks))
        .unify()
        .or(screen_route(state.clone(), Screen::Swot))
        .unify()
        .or(screen_route(state.clone(), Screen::Kri))
        .unify()
        .or(screen_route(state.clone(), Screen::Plans))
        .unify()
        .or(delete_action::<Risks>(state.clone(), Screen::Risks))
        .unify()
        .or(delete_action::<SwotFactors>(state.clone(), Screen::Swot))
        .unify()
        .or(delete_action::<Indicators>(state.clone(), Screen::Kri))
        .unify()
        .or(delete_action::<StrategicPlans>(state, Screen::Plans))
        .unify()
        .boxed()
}

async fn sign_in(state: AppState, form: HashMap<String, String>) -> Result<Response, ApiError> {
    let email = form.get("email").map(|e| e.trim()).unwrap_or_default();
    let password = form.get("password").map(String::as_str).unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Ok(warp::reply::with_status(
            warp::reply::html(views::login(Some("Email dan kata sandi wajib diisi"))),
            StatusCode::BAD_REQUEST,
        )
        .into_response());
    }
    match state.auth.sign_in(email, password).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "page session started");
            see_other("/app/dashboard", Some(session_cookie(&session.access_token)))
        }
        Err(e) if e.is_unauthorized() => Ok(warp::reply::with_status(
            warp::reply::html(views::login(Some("Email atau kata sandi salah"))),
            StatusCode::UNAUTHORIZED,
        )
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn sign_out(state: AppState, token: Option<String>) -> Result<Response, ApiError> {
    if let Some(token) = token {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!(error = %e, "sign out failed, clearing cookie anyway");
        }
    }
    see_other("/login", Some(expired_cookie()))
}

fn screen_route(state: AppState, screen: Screen) -> BoxedFilter<(Response,)> {
    warp::path("app")
        .and(warp::path(screen.slug()))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_page_caller(state.clone()))
        .and(with_state(state))
        .and_then(move |caller: Caller, state: AppState| async move {
            run(async move {
                let html = render(&state, &caller, screen).await?;
                Ok::<_, ApiError>(warp::reply::html(html))
            })
            .await
        })
        .boxed()
}

async fn render(state: &AppState, caller: &Caller, screen: Screen) -> Result<String, ApiError> {
    let frame = frame(caller);
    let html = match screen {
        Screen::Dashboard => views::dashboard(frame, &dashboard_summary(state, caller).await?),
        Screen::Risks => views::risks(frame, &risk_register(state, caller).await?),
        Screen::Swot => {
            let (factors, units) = futures::try_join!(
                data::swot_factors(state, caller, Vec::new()),
                state.work_units(),
            )?;
            let summaries = swot::summarize(&factors);
            let rows: Vec<_> = factors.into_iter().map(SwotFactor::present).collect();
            views::swot(frame, &summaries, &rows, &units)
        }
        Screen::Kri => {
            let indicators: Vec<_> = data::indicators(state, caller)
                .await?
                .into_iter()
                .map(KeyRiskIndicator::present)
                .collect();
            views::kri(frame, &indicators)
        }
        Screen::Plans => {
            let plans: Vec<_> = data::plans(state, caller)
                .await?
                .into_iter()
                .map(RencanaStrategis::present)
                .collect();
            views::plans(frame, &plans)
        }
    };
    Ok(html)
}

fn delete_action<R: Resource>(state: AppState, screen: Screen) -> BoxedFilter<(Response,)> {
    warp::path("app")
        .and(warp::path(screen.slug()))
        .and(warp::path::param::<Uuid>())
        .and(warp::path("delete"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_page_caller(state.clone()))
        .and(with_state(state))
        .and_then(move |id: Uuid, caller: Caller, state: AppState| async move {
            run(async move {
                delete_for_page::<R>(&state, &caller, id).await?;
                see_other(&format!("/app/{}", screen.slug()), None)
            })
            .await
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("tok");
        assert!(cookie.starts_with("access_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(expired_cookie().contains("Max-Age=0"));
    }
}
