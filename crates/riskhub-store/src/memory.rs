//! In-memory row store
//!
//! Backs local development and every HTTP-level test. Semantics follow the
//! PostgREST backend: generated `id` on insert, and-ed filters, nulls sorted
//! last, many-to-one joins embedded under their alias.

use crate::error::StoreError;
use crate::query::{Filter, Join, Query};
use crate::row_store::{require_filters, RowStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use riskhub_core::Row;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Tables held as vectors of JSON rows
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing id generation
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Copy of every row in a table
    #[must_use]
    pub fn dump(&self, table: &str) -> Vec<Row> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    /// Number of rows in a table
    #[must_use]
    pub fn count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }

    fn embed(tables: &HashMap<String, Vec<Row>>, row: &mut Row, join: &Join) {
        let target = row
            .get(&join.foreign_key)
            .filter(|v| !v.is_null())
            .and_then(|fk| {
                let key = Filter::eq("id", fk.clone());
                tables
                    .get(&join.table)
                    .and_then(|rows| rows.iter().find(|r| key.matches(r)))
            })
            .map(|found| Value::Object(project(found, &join.columns)));
        row.insert(join.alias.clone(), target.unwrap_or(Value::Null));
    }
}

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    columns
        .iter()
        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
        .collect()
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read();
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        for row in &mut rows {
            for join in &query.joins {
                Self::embed(&tables, row, join);
            }
        }
        if !query.columns.is_empty() {
            let mut keep = query.columns.clone();
            keep.extend(query.joins.iter().map(|j| j.alias.clone()));
            rows = rows.iter().map(|r| project(r, &keep)).collect();
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let stored: Vec<Row> = rows
            .into_iter()
            .map(|mut row| {
                let missing_id = row.get("id").map_or(true, Value::is_null);
                if missing_id {
                    row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
                }
                row
            })
            .collect();
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        require_filters("update", table, filters)?;
        let mut tables = self.tables.write();
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut() {
                if filters.iter().all(|f| f.matches(row)) {
                    for (k, v) in &patch {
                        row.insert(k.clone(), v.clone());
                    }
                    updated.push(row.clone());
                }
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        require_filters("delete", table, filters)?;
        if let Some(rows) = self.tables.write().get_mut(table) {
            rows.retain(|r| !filters.iter().all(|f| f.matches(r)));
        }
        Ok(())
    }
}
