//! The row store seam

use crate::error::StoreError;
use crate::query::{Filter, Query};
use async_trait::async_trait;
use riskhub_core::Row;

/// Table-oriented data access
///
/// No transactions and no retries: every call is a single round trip and its
/// failure is returned to the caller as is.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Rows of `table` matching the query
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Insert rows, returning them as stored
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Merge `patch` into every matching row, returning the updated rows
    async fn update(&self, table: &str, filters: &[Filter], patch: Row)
        -> Result<Vec<Row>, StoreError>;

    /// Delete every matching row
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError>;
}

/// Reject update and delete calls that would touch a whole table
pub(crate) fn require_filters(
    operation: &'static str,
    table: &str,
    filters: &[Filter],
) -> Result<(), StoreError> {
    if filters.is_empty() {
        return Err(StoreError::Unfiltered {
            operation,
            table: table.to_string(),
        });
    }
    Ok(())
}
