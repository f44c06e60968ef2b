//! Auth collaborator: password sign-in and token introspection

use crate::config::BaasConfig;
use crate::error::AuthError;
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Authenticated user as known to the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued by a successful sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Password sign-in and bearer token resolution
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange email and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Resolve an access token to its user
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    /// Revoke an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// GoTrue-style auth API client
#[derive(Debug, Clone)]
pub struct GoTrueAuth {
    client: Client,
    config: BaasConfig,
}

impl GoTrueAuth {
    /// Build a client with the configured timeout
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(config: BaasConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Use an existing client
    #[must_use]
    pub fn with_client(client: Client, config: BaasConfig) -> Self {
        Self { client, config }
    }

    async fn failure(response: reqwest::Response) -> AuthError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        warn!(status, "auth service request failed");
        AuthError::Backend { status, message }
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl AuthProvider for GoTrueAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        debug!(email, "password sign-in");
        let response = self
            .client
            .post(self.config.auth_url("token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        match response.status() {
            s if s.is_success() => response
                .json::<Session>()
                .await
                .map_err(|e| AuthError::Transport(e.to_string())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            _ => Err(Self::failure(response).await),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.config.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        match response.status() {
            s if s.is_success() => response
                .json::<AuthUser>()
                .await
                .map_err(|e| AuthError::Transport(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            _ => Err(Self::failure(response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.config.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            _ => Err(Self::failure(response).await),
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
}

/// In-process auth with opaque random tokens
#[derive(Debug, Default)]
pub struct MemoryAuth {
    accounts: DashMap<String, Account>,
    sessions: DashMap<String, AuthUser>,
}

impl MemoryAuth {
    /// Create empty provider
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with a fresh user id
    pub fn add_user(&self, email: &str, password: &str) -> AuthUser {
        self.add_user_with_id(Uuid::new_v4(), email, password)
    }

    /// Register an account with a known user id
    pub fn add_user_with_id(&self, id: Uuid, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id,
            email: Some(email.to_string()),
        };
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    /// Issue a session without a password check
    #[must_use]
    pub fn issue_token(&self, user: &AuthUser) -> String {
        let token = format!("mem-{}", Uuid::new_v4().simple());
        self.sessions.insert(token.clone(), user.clone());
        token
    }

    /// Number of live sessions
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self
            .accounts
            .get(&email.to_lowercase())
            .filter(|a| a.password == password)
            .map(|a| a.user.clone())
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(Session {
            access_token: self.issue_token(&user),
            token_type: default_token_type(),
            expires_in: Some(3600),
            refresh_token: None,
            user,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.sessions
            .get(access_token)
            .map(|u| u.clone())
            .ok_or(AuthError::InvalidToken)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.sessions
            .remove(access_token)
            .map(|_| ())
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_auth_session_lifecycle() {
        let auth = MemoryAuth::new();
        let user = auth.add_user("Admin@RS.id", "rahasia");

        assert!(matches!(
            auth.sign_in("admin@rs.id", "salah").await,
            Err(AuthError::InvalidCredentials)
        ));

        let session = auth.sign_in("admin@rs.id", "rahasia").await.unwrap();
        assert!(!session.access_token.is_empty());
        assert_eq!(auth.get_user(&session.access_token).await.unwrap(), user);

        auth.sign_out(&session.access_token).await.unwrap();
        assert!(matches!(
            auth.get_user(&session.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn session_decodes_gotrue_shape() {
        let body = serde_json::json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": {"id": Uuid::nil(), "email": "a@b.c", "role": "authenticated"}
        });
        let s: Session = serde_json::from_value(body).unwrap();
        assert_eq!(s.user.id, Uuid::nil());
        assert_eq!(s.expires_in, Some(3600));
    }
}
