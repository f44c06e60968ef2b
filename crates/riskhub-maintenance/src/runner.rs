//! Job registry and execution

use crate::error::JobError;
use crate::job::{Change, MaintenanceJob};
use crate::jobs;
use crate::ledger::{JobRun, Ledger};
use chrono::Utc;
use riskhub_store::RowStore;
use std::sync::Arc;
use tracing::{info, warn};

/// How to run a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Plan and report, write nothing
    pub dry_run: bool,
    /// Run even if the ledger already has this version
    pub force: bool,
}

/// Outcome of one job run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub job_id: &'static str,
    pub version: u32,
    pub changes: Vec<Change>,
    /// Rows written; zero on a dry run
    pub written: usize,
    pub dry_run: bool,
    /// Ledger already had this version and `force` was not set
    pub skipped: bool,
}

/// Registry state of one job
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub id: &'static str,
    pub version: u32,
    pub description: &'static str,
    pub last_run: Option<JobRun>,
}

impl JobStatus {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last_run.is_none()
    }
}

/// Runs registered jobs against one store
pub struct Runner {
    store: Arc<dyn RowStore>,
    jobs: Vec<Box<dyn MaintenanceJob>>,
}

impl Runner {
    /// Runner with every built-in job
    #[must_use]
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self::with_jobs(store, jobs::all())
    }

    #[must_use]
    pub fn with_jobs(store: Arc<dyn RowStore>, jobs: Vec<Box<dyn MaintenanceJob>>) -> Self {
        Self { store, jobs }
    }

    /// Registered jobs in run order
    pub fn jobs(&self) -> impl Iterator<Item = &dyn MaintenanceJob> {
        self.jobs.iter().map(|j| j.as_ref())
    }

    /// # Errors
    /// [`JobError::UnknownJob`] if no job has this id.
    pub fn find(&self, id: &str) -> Result<&dyn MaintenanceJob, JobError> {
        self.jobs()
            .find(|j| j.id() == id)
            .ok_or_else(|| JobError::UnknownJob(id.to_string()))
    }

    /// Ledger state of every job
    ///
    /// # Errors
    /// Store failure.
    pub async fn status(&self) -> Result<Vec<JobStatus>, JobError> {
        let ledger = Ledger::new(self.store.as_ref());
        let mut out = Vec::with_capacity(self.jobs.len());
        for job in self.jobs() {
            out.push(JobStatus {
                id: job.id(),
                version: job.version(),
                description: job.description(),
                last_run: ledger.applied(job).await?,
            });
        }
        Ok(out)
    }

    /// Run one job by id
    ///
    /// # Errors
    /// Unknown job, failed precondition, or store failure.
    pub async fn run(&self, id: &str, options: RunOptions) -> Result<RunReport, JobError> {
        let job = self.find(id)?;
        self.run_job(job, options).await
    }

    /// Run every job the ledger has no record of at its current version
    ///
    /// Stops at the first failure.
    ///
    /// # Errors
    /// As [`Runner::run`].
    pub async fn run_pending(&self, options: RunOptions) -> Result<Vec<RunReport>, JobError> {
        let ledger = Ledger::new(self.store.as_ref());
        let mut reports = Vec::new();
        for job in self.jobs() {
            if ledger.applied(job).await?.is_some() {
                continue;
            }
            reports.push(
                self.run_job(
                    job,
                    RunOptions {
                        force: true,
                        ..options
                    },
                )
                .await?,
            );
        }
        Ok(reports)
    }

    async fn run_job(
        &self,
        job: &dyn MaintenanceJob,
        options: RunOptions,
    ) -> Result<RunReport, JobError> {
        let store = self.store.as_ref();
        let ledger = Ledger::new(store);
        let mut report = RunReport {
            job_id: job.id(),
            version: job.version(),
            changes: Vec::new(),
            written: 0,
            dry_run: options.dry_run,
            skipped: false,
        };

        if !options.force {
            if let Some(run) = ledger.applied(job).await? {
                info!(
                    job = job.id(),
                    version = job.version(),
                    applied_at = %run.applied_at,
                    "already applied, skipping"
                );
                report.skipped = true;
                return Ok(report);
            }
        }

        if let Err(e) = job.precondition(store).await {
            warn!(job = job.id(), error = %e, "precondition failed");
            return Err(e);
        }

        report.changes = job.plan(store).await?;
        info!(
            job = job.id(),
            planned = report.changes.len(),
            dry_run = options.dry_run,
            "job planned"
        );
        if options.dry_run {
            return Ok(report);
        }

        report.written = job.apply(store, &report.changes).await?;
        ledger.record(job, report.written, Utc::now()).await?;
        info!(job = job.id(), written = report.written, "job applied");
        Ok(report)
    }
}
