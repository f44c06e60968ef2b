//! Short-lived cache of lookup tables
//!
//! Work units and risk categories are read on almost every page and report
//! but change rarely. Rows are kept per table for a configurable TTL and
//! dropped whenever the table is written through the API.

use moka::future::Cache;
use riskhub_core::Row;
use riskhub_store::{Query, RowStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Lookup table rows keyed by table name
#[derive(Debug, Clone)]
pub struct LookupCache {
    inner: Cache<String, Arc<Vec<Row>>>,
}

impl LookupCache {
    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(64).time_to_live(ttl).build(),
        }
    }

    /// Cached rows of `table`, loading them ordered by `order_by` on a miss
    ///
    /// # Errors
    /// Store failure while loading; failures are not cached.
    pub async fn rows(
        &self,
        store: &dyn RowStore,
        table: &str,
        order_by: &str,
    ) -> Result<Arc<Vec<Row>>, StoreError> {
        if let Some(cached) = self.inner.get(table).await {
            return Ok(cached);
        }

        debug!(table, "lookup cache miss");
        let rows = Arc::new(store.select(table, &Query::new().order_asc(order_by)).await?);
        self.inner.insert(table.to_string(), Arc::clone(&rows)).await;
        Ok(rows)
    }

    /// Drop the cached rows of one table
    #[inline]
    pub async fn invalidate(&self, table: &str) {
        self.inner.invalidate(table).await;
    }

    /// Check whether a table is currently cached
    #[must_use]
    pub async fn contains(&self, table: &str) -> bool {
        self.inner.get(table).await.is_some()
    }
}
