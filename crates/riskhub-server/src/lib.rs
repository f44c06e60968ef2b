//! RiskHub Server - HTTP API and server-rendered pages
//!
//! A thin warp layer over the domain rules in `riskhub-core`:
//! - [`crud`]: list / get / create / update / delete per [`resource::Resource`]
//! - [`aggregates`]: dashboard, risk register, SWOT summary and bulk replace, TOWS generation
//! - [`reports`]: Excel and PDF downloads
//! - [`pages`]: cookie-session screens under `/app`
//!
//! Every request is scoped to the caller's organization unless the caller is
//! a superadmin.
//!
//! # Example
//!
//! ```rust,ignore
//! use riskhub_server::{build_state, routes, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let state = build_state(ServerConfig::memory())?;
//! warp::serve(routes::routes(state)).run(([127, 0, 0, 1], 3000)).await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregates;
pub mod auth_api;
pub mod cache;
pub mod caller;
pub mod config;
pub mod crud;
pub mod data;
pub mod error;
pub mod pages;
pub mod reports;
pub mod resource;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod views;

// Re-exports for convenience
pub use caller::Caller;
pub use config::{BackendKind, ConfigError, LogFormat, ServerConfig};
pub use error::ApiError;
pub use state::AppState;

use riskhub_core::{tables, to_row, UserProfile, UserRole};
use riskhub_store::{AuthError, GoTrueAuth, MemoryAuth, MemoryStore, PostgrestStore, StoreError};
use std::sync::Arc;
use tracing::info;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Failure assembling collaborators at startup
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("hosted backend selected without its configuration")]
    MissingBaas,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("seeding memory admin: {0}")]
    Seed(String),
}

/// Build the row store and auth collaborators named by the configuration
///
/// With the memory backend, `memory_admin` becomes a superadmin account.
///
/// # Errors
/// HTTP client construction, or a hosted backend without configuration.
pub fn build_state(config: ServerConfig) -> Result<AppState, StartupError> {
    match config.backend {
        BackendKind::Baas => {
            let baas = config.baas.clone().ok_or(StartupError::MissingBaas)?;
            let store = PostgrestStore::new(baas.clone())?;
            let auth = GoTrueAuth::new(baas)?;
            info!(backend = "baas", "collaborators ready");
            Ok(AppState::new(Arc::new(store), Arc::new(auth), config))
        }
        BackendKind::Memory => {
            let store = MemoryStore::new();
            let auth = MemoryAuth::new();
            if let Some(admin) = &config.memory_admin {
                let user = auth.add_user(&admin.email, &admin.password);
                let profile = UserProfile {
                    id: user.id,
                    email: admin.email.clone(),
                    full_name: Some("Administrator".to_string()),
                    role: UserRole::Superadmin,
                    organization_id: None,
                };
                let row = to_row(&profile).map_err(|e| StartupError::Seed(e.to_string()))?;
                store.seed(tables::USER_PROFILES, [row]);
                info!(email = %admin.email, "memory admin seeded");
            }
            info!(backend = "memory", "collaborators ready");
            Ok(AppState::new(Arc::new(store), Arc::new(auth), config))
        }
    }
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{build_state, ApiError, AppState, Caller, ServerConfig};
}
