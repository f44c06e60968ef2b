//! Error types for the row store and auth collaborators

/// Row store failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("request to {table} timed out")]
    Timeout {
        /// Table being accessed
        table: String,
    },

    /// Backend answered with an error status
    #[error("backend returned {status} for {table}: {message}")]
    Backend {
        /// Table being accessed
        table: String,
        /// HTTP status
        status: u16,
        /// Backend error code, when supplied
        code: Option<String>,
        /// Backend message
        message: String,
    },

    /// Response body was not the expected row array
    #[error("could not decode response from {table}: {reason}")]
    Decode {
        /// Table being accessed
        table: String,
        /// Decoder message
        reason: String,
    },

    /// Update or delete without any filter
    #[error("refusing unfiltered {operation} on {table}")]
    Unfiltered {
        /// `update` or `delete`
        operation: &'static str,
        /// Table being accessed
        table: String,
    },
}

impl StoreError {
    /// Create a backend error
    #[must_use]
    pub fn backend(table: &str, status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            table: table.to_string(),
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Check if the failure may be transient
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Backend { status, .. } => *status >= 500,
            Self::Decode { .. } | Self::Unfiltered { .. } => false,
        }
    }
}

/// Auth collaborator failure
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email or password rejected
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// Access token unknown, expired or revoked
    #[error("invalid or expired access token")]
    InvalidToken,

    /// Auth service answered with an unexpected status
    #[error("auth service returned {status}: {message}")]
    Backend {
        /// HTTP status
        status: u16,
        /// Service message
        message: String,
    },

    /// Request never got a response
    #[error("auth transport error: {0}")]
    Transport(String),
}

impl AuthError {
    /// Check if the caller supplied bad credentials or token
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::InvalidToken)
    }
}
