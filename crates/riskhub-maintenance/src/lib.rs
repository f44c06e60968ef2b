//! RiskHub Maintenance - versioned data repair jobs
//!
//! Each [`MaintenanceJob`] plans row changes from current data and applies
//! them on request. Jobs are idempotent: a second run plans nothing.
//! Applied runs are recorded in `maintenance_job_runs` so `run-pending`
//! only picks up what has not run at its current version.
//!
//! # Example
//!
//! ```rust,ignore
//! use riskhub_maintenance::{RunOptions, Runner};
//! use riskhub_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), riskhub_maintenance::JobError> {
//! let runner = Runner::new(Arc::new(MemoryStore::new()));
//! let report = runner
//!     .run("seed-master-data", RunOptions { dry_run: true, force: false })
//!     .await?;
//! for change in &report.changes {
//!     println!("{change}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod job;
pub mod jobs;
pub mod ledger;
pub mod runner;

// Re-exports for convenience
pub use error::JobError;
pub use job::{apply_changes, Change, MaintenanceJob};
pub use ledger::{JobRun, Ledger};
pub use runner::{JobStatus, RunOptions, RunReport, Runner};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
