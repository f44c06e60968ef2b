//! API error type and rejection recovery
//!
//! Every handler fails with [`ApiError`]; [`handle_rejection`] turns it (and
//! warp's own rejections) into the JSON error body
//! `{"error": {"code", "message", "details"}}`.

use riskhub_core::{CoreError, FieldError, InvariantError, ValidationError};
use riskhub_report::ReportError;
use riskhub_store::{AuthError, StoreError};
use serde::Serialize;
use std::convert::Infallible;
use tracing::{error, warn};
use warp::http::{StatusCode, Uri};
use warp::reject::Reject;
use warp::{Rejection, Reply};

/// Handler failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Body or parameter could not be read at all
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body read but fields rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing, unknown or expired access token
    #[error("authentication required")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No such resource or row
    #[error("{0} not found")]
    NotFound(String),

    /// Write would break an aggregate invariant
    #[error(transparent)]
    Invariant(#[from] InvariantError),

    /// Row store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Auth service failed for a reason other than bad credentials
    #[error("auth service error: {0}")]
    Upstream(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),

    /// Page request without a session; answered with a redirect
    #[error("login required")]
    LoginRequired,
}

impl Reject for ApiError {}

impl ApiError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a forbidden error
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Invariant(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::LoginRequired => StatusCode::SEE_OTHER,
        }
    }

    /// Stable snake_case code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_failed",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Invariant(_) => "invariant_violated",
            Self::Store(_) | Self::Upstream(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
            Self::LoginRequired => "login_required",
        }
    }

    /// Response body; upstream and internal causes are logged, not echoed
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            Self::Store(e) => {
                error!(error = %e, transient = e.is_transient(), "row store request failed");
                "data store request failed".to_string()
            }
            Self::Upstream(e) => {
                error!(error = %e, "auth service request failed");
                "auth service request failed".to_string()
            }
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            Self::Validation(v) => v.fields.clone(),
            _ => Vec::new(),
        };
        ErrorBody {
            error: ErrorPayload {
                code: self.code(),
                message,
                details,
            },
        }
    }

    /// Full reply for this error
    #[must_use]
    pub fn into_reply(self) -> Box<dyn Reply> {
        if matches!(self, Self::LoginRequired) {
            return Box::new(warp::redirect::see_other(Uri::from_static("/login")));
        }
        let status = self.status();
        Box::new(warp::reply::with_status(
            warp::reply::json(&self.body()),
            status,
        ))
    }
}

/// `{"error": {...}}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

/// Error payload
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
    pub details: Vec<FieldError>,
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => Self::Validation(v),
            CoreError::Invariant(i) => Self::Invariant(i),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Turn a rejection into a JSON error reply
pub async fn handle_rejection(err: Rejection) -> Result<Box<dyn Reply>, Infallible> {
    if let Some(api) = err.find::<ApiError>() {
        return Ok(api.clone().into_reply());
    }
    let api = if err.is_not_found() {
        ApiError::not_found("route")
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::BadRequest(e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        ApiError::BadRequest(e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(status_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "method not allowed",
        ));
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(status_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "payload too large",
        ));
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        ApiError::BadRequest(e.to_string())
    } else {
        warn!(rejection = ?err, "unhandled rejection");
        ApiError::Internal("unhandled rejection".to_string())
    };
    Ok(api.into_reply())
}

fn status_reply(status: StatusCode, code: &'static str, message: &str) -> Box<dyn Reply> {
    let body = ErrorBody {
        error: ErrorPayload {
            code,
            message: message.to_string(),
            details: Vec::new(),
        },
    };
    Box::new(warp::reply::with_status(warp::reply::json(&body), status))
}
