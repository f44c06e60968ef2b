use crate::error::JobError;
use crate::job::{Change, MaintenanceJob};
use async_trait::async_trait;
use riskhub_core::{tables, Row};
use riskhub_store::{Join, Query, RowStore};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// Unit segment for risks without a work unit
pub const GENERAL_UNIT: &str = "UMUM";

/// Give risks without `kode_risiko` a code `R-<unit code>-<nnn>`
///
/// Numbering continues from the highest existing number for the same
/// organization and unit code.
pub struct BackfillRiskCodes;

#[derive(Debug, Deserialize)]
struct UnitCode {
    code: String,
}

#[derive(Debug, Deserialize)]
struct CodeRow {
    id: Uuid,
    #[serde(default)]
    kode_risiko: Option<String>,
    #[serde(default)]
    organization_id: Option<Uuid>,
    #[serde(default)]
    unit: Option<UnitCode>,
}

impl CodeRow {
    fn unit_code(&self) -> String {
        self.unit
            .as_ref()
            .map(|u| u.code.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| GENERAL_UNIT.to_string())
    }

    fn has_code(&self) -> bool {
        self.kode_risiko
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

/// `R-IGD-007` -> `("IGD", 7)`
fn parse_code(code: &str) -> Option<(&str, u32)> {
    let rest = code.trim().strip_prefix("R-")?;
    let (unit, number) = rest.rsplit_once('-')?;
    Some((unit, number.parse().ok()?))
}

#[async_trait]
impl MaintenanceJob for BackfillRiskCodes {
    fn id(&self) -> &'static str {
        "backfill-risk-codes"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "assign R-<unit>-<nnn> codes to risks without kode_risiko"
    }

    async fn precondition(&self, store: &dyn RowStore) -> Result<(), JobError> {
        let units = store
            .select(tables::WORK_UNITS, &Query::new().columns(&["id"]).limit(1))
            .await?;
        if units.is_empty() {
            return Err(JobError::precondition(
                self.id(),
                "master_work_units is empty; run seed-master-data first",
            ));
        }
        Ok(())
    }

    async fn plan(&self, store: &dyn RowStore) -> Result<Vec<Change>, JobError> {
        let query = Query::new()
            .columns(&["id", "kode_risiko", "organization_id", "created_at"])
            .join(Join::new("unit", tables::WORK_UNITS, "unit_kerja_id", &["code"]))
            .order_asc("created_at")
            .order_asc("id");
        let rows: Vec<CodeRow> = store
            .select(tables::RISK_INPUTS, &query)
            .await?
            .into_iter()
            .filter_map(|row| match serde_json::from_value(Value::Object(row)) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable risk row");
                    None
                }
            })
            .collect();

        let mut highest: HashMap<(Option<Uuid>, String), u32> = HashMap::new();
        for row in rows.iter().filter(|r| r.has_code()) {
            let Some((unit, number)) = row.kode_risiko.as_deref().and_then(parse_code) else {
                continue;
            };
            let entry = highest
                .entry((row.organization_id, unit.to_uppercase()))
                .or_insert(0);
            *entry = (*entry).max(number);
        }

        let mut changes = Vec::new();
        for row in rows.iter().filter(|r| !r.has_code()) {
            let unit = row.unit_code();
            let next = highest.entry((row.organization_id, unit.clone())).or_insert(0);
            *next += 1;
            let code = format!("R-{unit}-{:03}", *next);
            let mut patch = Row::new();
            patch.insert("kode_risiko".into(), Value::String(code.clone()));
            changes.push(Change::Update {
                table: tables::RISK_INPUTS,
                id: row.id,
                patch,
                note: format!("kode_risiko -> {code}"),
            });
        }
        Ok(changes)
    }
}
