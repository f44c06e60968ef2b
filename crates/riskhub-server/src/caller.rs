//! Bearer-token authorization
//!
//! A request carries its access token in `Authorization: Bearer <token>` or,
//! for pages, in the `access_token` cookie. The token is resolved through the
//! auth collaborator to a user id, and the `user_profiles` row of that id
//! supplies role and organization.

use crate::error::ApiError;
use crate::state::{with_state, AppState};
use riskhub_core::{from_row, tables, UserProfile, UserRole};
use riskhub_store::{Filter, Query};
use tracing::debug;
use uuid::Uuid;
use warp::{Filter as _, Rejection};

/// Cookie holding the access token of a page session
pub const SESSION_COOKIE: &str = "access_token";

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
    pub access_token: String,
}

impl Caller {
    /// Filters restricting organization tables to what the caller may see
    ///
    /// # Errors
    /// [`ApiError::Forbidden`] for a non-global caller without organization.
    pub fn org_filters(&self) -> Result<Vec<Filter>, ApiError> {
        if self.role.is_global() {
            return Ok(Vec::new());
        }
        match self.organization_id {
            Some(org) => Ok(vec![Filter::eq("organization_id", org.to_string())]),
            None => Err(ApiError::forbidden("account has no organization")),
        }
    }

    /// Organization a new row is stamped with
    ///
    /// Only a superadmin may write on behalf of another organization.
    ///
    /// # Errors
    /// [`ApiError::Forbidden`] for a non-global caller without organization.
    pub fn owning_org(&self, requested: Option<Uuid>) -> Result<Option<Uuid>, ApiError> {
        if self.role.is_global() {
            return Ok(requested.or(self.organization_id));
        }
        self.organization_id
            .map(Some)
            .ok_or_else(|| ApiError::forbidden("account has no organization"))
    }

    /// # Errors
    /// Viewers may not write.
    pub fn require_write(&self) -> Result<(), ApiError> {
        if self.role.can_write() {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!("role {} may not write", self.role_name())))
        }
    }

    /// # Errors
    /// Deletes need manager or above.
    pub fn require_delete(&self) -> Result<(), ApiError> {
        if self.role.can_delete() {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!("role {} may not delete", self.role_name())))
        }
    }

    /// # Errors
    /// Master tables are written by admins only.
    pub fn require_master(&self) -> Result<(), ApiError> {
        if self.role.can_manage_master() {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "role {} may not change master data",
                self.role_name()
            )))
        }
    }

    /// Name to greet the caller with
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }

    fn role_name(&self) -> String {
        serde_json::to_value(self.role)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.role))
    }
}

fn bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Access token from the header, falling back to the session cookie
pub fn access_token() -> impl warp::Filter<Extract = (Option<String>,), Error = Rejection> + Clone
{
    warp::header::optional::<String>("authorization")
        .and(warp::cookie::optional::<String>(SESSION_COOKIE))
        .map(|header: Option<String>, cookie: Option<String>| {
            header
                .as_deref()
                .and_then(bearer)
                .map(str::to_string)
                .or(cookie)
                .filter(|t| !t.trim().is_empty())
        })
}

/// Resolve a token to a caller
///
/// # Errors
/// [`ApiError::Unauthorized`] for a missing or rejected token,
/// [`ApiError::Forbidden`] when the account has no profile.
pub async fn authenticate(state: &AppState, token: Option<String>) -> Result<Caller, ApiError> {
    let token = token.ok_or(ApiError::Unauthorized)?;
    let user = state.auth.get_user(&token).await?;

    let rows = state
        .store
        .select(
            tables::USER_PROFILES,
            &Query::new().eq("id", user.id.to_string()).limit(1),
        )
        .await?;
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::forbidden("account has no profile"))?;
    let profile: UserProfile = from_row(row)?;

    debug!(user_id = %profile.id, role = ?profile.role, "caller authenticated");
    Ok(Caller {
        user_id: profile.id,
        email: profile.email,
        full_name: profile.full_name,
        role: profile.role,
        organization_id: profile.organization_id,
        access_token: token,
    })
}

/// Filter yielding the authenticated caller or rejecting with 401
pub fn with_caller(
    state: AppState,
) -> impl warp::Filter<Extract = (Caller,), Error = Rejection> + Clone {
    with_state(state)
        .and(access_token())
        .and_then(|state: AppState, token: Option<String>| async move {
            authenticate(&state, token)
                .await
                .map_err(warp::reject::custom)
        })
}

/// Like [`with_caller`], but a missing session redirects to the login page
pub fn with_page_caller(
    state: AppState,
) -> impl warp::Filter<Extract = (Caller,), Error = Rejection> + Clone {
    with_state(state)
        .and(access_token())
        .and_then(|state: AppState, token: Option<String>| async move {
            authenticate(&state, token).await.map_err(|e| match e {
                ApiError::Unauthorized => warp::reject::custom(ApiError::LoginRequired),
                other => warp::reject::custom(other),
            })
        })
}
