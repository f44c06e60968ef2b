//! The job seam and the changes a job plans

use crate::error::JobError;
use async_trait::async_trait;
use riskhub_core::Row;
use riskhub_store::{Filter, RowStore};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// One row-level write planned by a job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    /// Merge `patch` into the row with `id`
    Update {
        table: &'static str,
        id: Uuid,
        patch: Row,
        note: String,
    },
    /// Insert a new row
    Insert {
        table: &'static str,
        row: Row,
        note: String,
    },
}

impl Change {
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Self::Update { table, .. } | Self::Insert { table, .. } => table,
        }
    }

    /// Human-readable summary
    #[must_use]
    pub fn note(&self) -> &str {
        match self {
            Self::Update { note, .. } | Self::Insert { note, .. } => note,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update { table, id, note, .. } => write!(f, "update {table} {id}: {note}"),
            Self::Insert { table, note, .. } => write!(f, "insert {table}: {note}"),
        }
    }
}

/// A versioned, idempotent data repair
///
/// `plan` reads current data and returns what would change; running the
/// job again after `apply` must plan nothing. Bump `version` when the
/// job's logic changes so `run-pending` picks it up again.
#[async_trait]
pub trait MaintenanceJob: Send + Sync {
    /// Stable id used on the command line and in the ledger
    fn id(&self) -> &'static str;

    fn version(&self) -> u32;

    fn description(&self) -> &'static str;

    /// Refuse to run when the data is not ready
    async fn precondition(&self, _store: &dyn RowStore) -> Result<(), JobError> {
        Ok(())
    }

    /// Compute the changes against current data
    async fn plan(&self, store: &dyn RowStore) -> Result<Vec<Change>, JobError>;

    /// Write the planned changes, returning how many rows were written
    async fn apply(&self, store: &dyn RowStore, changes: &[Change]) -> Result<usize, JobError> {
        apply_changes(store, changes).await
    }
}

/// Write changes one row at a time, in plan order
///
/// # Errors
/// The first store failure; earlier changes stay written.
pub async fn apply_changes(store: &dyn RowStore, changes: &[Change]) -> Result<usize, JobError> {
    let mut written = 0;
    for change in changes {
        match change {
            Change::Update {
                table, id, patch, ..
            } => {
                written += store
                    .update(table, &[Filter::eq("id", id.to_string())], patch.clone())
                    .await?
                    .len();
            }
            Change::Insert { table, row, .. } => {
                written += store.insert(table, vec![row.clone()]).await?.len();
            }
        }
    }
    Ok(written)
}
