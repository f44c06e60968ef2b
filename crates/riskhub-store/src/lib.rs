//! RiskHub Store - data-access collaborators
//!
//! Two seams, each with a hosted and an in-memory implementation:
//! - [`RowStore`]: select / insert / update / delete over JSON rows
//! - [`AuthProvider`]: password sign-in, token introspection, sign-out
//!
//! # Example
//!
//! ```rust,ignore
//! use riskhub_store::{BaasConfig, PostgrestStore, Query, RowStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BaasConfig::new("https://proj.supabase.co", "anon", "service");
//! let store = PostgrestStore::new(config)?;
//! let rows = store
//!     .select("swot_analisis", &Query::new().eq("tahun", 2025).order_asc("kategori"))
//!     .await?;
//! println!("{} factors", rows.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod memory;
pub mod postgrest;
pub mod query;
pub mod row_store;

// Re-exports for convenience
pub use auth::{AuthProvider, AuthUser, GoTrueAuth, MemoryAuth, Session};
pub use config::BaasConfig;
pub use error::{AuthError, StoreError};
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use query::{Filter, FilterOp, Join, Order, Query};
pub use row_store::RowStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
