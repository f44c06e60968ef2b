use crate::error::JobError;
use crate::job::{Change, MaintenanceJob};
use async_trait::async_trait;
use riskhub_core::{tables, Row};
use riskhub_store::{Filter, Query, RowStore, StoreError};
use serde_json::Value;
use uuid::Uuid;

/// Null out `score` values stored by older clients; score is derived on read
pub struct ClearStoredSwotScore;

#[async_trait]
impl MaintenanceJob for ClearStoredSwotScore {
    fn id(&self) -> &'static str {
        "clear-stored-swot-score"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "null out legacy stored swot_analisis.score values"
    }

    async fn precondition(&self, store: &dyn RowStore) -> Result<(), JobError> {
        let sample = Query::new().columns(&["id", "score"]).limit(1);
        match store.select(tables::SWOT_ANALISIS, &sample).await {
            Ok(_) => Ok(()),
            Err(StoreError::Backend { status: 400, .. }) => Err(JobError::precondition(
                self.id(),
                "swot_analisis has no score column",
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn plan(&self, store: &dyn RowStore) -> Result<Vec<Change>, JobError> {
        let query = Query::new()
            .columns(&["id", "score"])
            .filter(Filter::not_null("score"))
            .order_asc("id");
        let rows = store.select(tables::SWOT_ANALISIS, &query).await?;

        let mut changes = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(id) = row
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
            else {
                continue;
            };
            let old = row.get("score").cloned().unwrap_or(Value::Null);
            let mut patch = Row::new();
            patch.insert("score".into(), Value::Null);
            changes.push(Change::Update {
                table: tables::SWOT_ANALISIS,
                id,
                patch,
                note: format!("score {old} -> null"),
            });
        }
        Ok(changes)
    }
}
