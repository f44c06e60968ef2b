//! Session endpoints and the health check

use crate::caller::{with_caller, Caller};
use crate::crud::{run, MAX_BODY_BYTES};
use crate::error::ApiError;
use crate::state::{with_state, AppState};
use riskhub_core::UserRole;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter as _, Reply};

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `GET /api/auth/me`
#[derive(Debug, Clone, Serialize)]
pub struct Me {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
}

impl From<&Caller> for Me {
    fn from(caller: &Caller) -> Self {
        Self {
            id: caller.user_id,
            email: caller.email.clone(),
            full_name: caller.full_name.clone(),
            role: caller.role,
            organization_id: caller.organization_id,
        }
    }
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// Mount login, logout, me and health
pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let health = warp::path!("api" / "health").and(warp::get()).map(|| {
        warp::reply::json(&Health {
            status: "ok",
            version: crate::VERSION,
        })
        .into_response()
    });

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<LoginRequest>())
        .and(with_state(state.clone()))
        .and_then(|body: LoginRequest, state: AppState| async move {
            run(async move {
                let session = state.auth.sign_in(body.email.trim(), &body.password).await?;
                info!(user_id = %session.user.id, "signed in");
                Ok::<_, ApiError>(warp::reply::json(&session))
            })
            .await
        });

    let logout = warp::path!("api" / "auth" / "logout")
        .and(warp::post())
        .and(with_caller(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|caller: Caller, state: AppState| async move {
            run(async move {
                state.auth.sign_out(&caller.access_token).await?;
                info!(user_id = %caller.user_id, "signed out");
                Ok::<_, ApiError>(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
            })
            .await
        });

    let me = warp::path!("api" / "auth" / "me")
        .and(warp::get())
        .and(with_caller(state))
        .map(|caller: Caller| warp::reply::json(&Me::from(&caller)).into_response());

    health
        .or(login)
        .unify()
        .or(logout)
        .unify()
        .or(me)
        .unify()
        .boxed()
}
