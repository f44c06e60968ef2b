//! Error types for maintenance jobs

use riskhub_core::CoreError;
use riskhub_store::StoreError;

/// Job failure
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// No job registered under this id
    #[error("unknown job: {0}")]
    UnknownJob(String),

    /// Data is not in a state the job can work on
    #[error("precondition of {job} failed: {reason}")]
    Precondition {
        /// Job id
        job: &'static str,
        /// What is missing
        reason: String,
    },

    /// Row store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Row conversion failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl JobError {
    /// Create a precondition failure
    #[must_use]
    pub fn precondition(job: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            job,
            reason: reason.into(),
        }
    }

    /// Check if the job refused to start
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}
