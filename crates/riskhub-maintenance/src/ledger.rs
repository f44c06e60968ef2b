//! Record of applied runs in `maintenance_job_runs`

use crate::error::JobError;
use crate::job::MaintenanceJob;
use chrono::{DateTime, Utc};
use riskhub_core::{tables, to_row};
use riskhub_store::{Query, RowStore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One applied run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRun {
    pub job_id: String,
    pub version: u32,
    pub applied_at: DateTime<Utc>,
    /// Rows written
    pub changes: usize,
}

/// Ledger over a row store
pub struct Ledger<'a> {
    store: &'a dyn RowStore,
}

impl<'a> Ledger<'a> {
    #[must_use]
    pub fn new(store: &'a dyn RowStore) -> Self {
        Self { store }
    }

    /// Every recorded run, oldest first
    ///
    /// # Errors
    /// Store failure.
    pub async fn runs(&self) -> Result<Vec<JobRun>, JobError> {
        let rows = self
            .store
            .select(tables::JOB_RUNS, &Query::new().order_asc("applied_at"))
            .await?;
        let mut runs = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<JobRun>(serde_json::Value::Object(row)) {
                Ok(run) => runs.push(run),
                Err(e) => warn!(error = %e, "skipping unreadable ledger row"),
            }
        }
        Ok(runs)
    }

    /// Latest run of a job at its current version or later
    ///
    /// # Errors
    /// Store failure.
    pub async fn applied(&self, job: &dyn MaintenanceJob) -> Result<Option<JobRun>, JobError> {
        Ok(self
            .runs()
            .await?
            .into_iter()
            .rev()
            .find(|r| r.job_id == job.id() && r.version >= job.version()))
    }

    /// Record a run
    ///
    /// # Errors
    /// Store failure.
    pub async fn record(
        &self,
        job: &dyn MaintenanceJob,
        changes: usize,
        applied_at: DateTime<Utc>,
    ) -> Result<JobRun, JobError> {
        let run = JobRun {
            job_id: job.id().to_string(),
            version: job.version(),
            applied_at,
            changes,
        };
        self.store
            .insert(tables::JOB_RUNS, vec![to_row(&run)?])
            .await?;
        Ok(run)
    }
}
