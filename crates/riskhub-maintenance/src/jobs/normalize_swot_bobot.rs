use crate::error::JobError;
use crate::job::{Change, MaintenanceJob};
use async_trait::async_trait;
use riskhub_core::normalize::DEFAULT_FLOOR;
use riskhub_core::swot::BOBOT_TOTAL;
use riskhub_core::validate::{lenient_f64_opt, lenient_i32};
use riskhub_core::{normalize_weights, tables, Row, SwotCategory};
use riskhub_store::{Query, RowStore};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Rescale every SWOT category whose bobot does not total 100
///
/// Groups are (organization, work unit, year, category). Each row keeps at
/// least [`DEFAULT_FLOOR`]; rows are ordered by creation time for tie breaks.
/// A row that cannot be read fails the whole plan, since leaving it out
/// would normalize its group against the wrong total.
pub struct NormalizeSwotBobot;

#[derive(Debug, Deserialize)]
struct BobotRow {
    id: Uuid,
    #[serde(default)]
    organization_id: Option<Uuid>,
    #[serde(default)]
    unit_kerja_id: Option<Uuid>,
    #[serde(deserialize_with = "lenient_i32")]
    tahun: i32,
    kategori: SwotCategory,
    #[serde(default, deserialize_with = "lenient_f64_opt")]
    bobot: Option<f64>,
}

type GroupKey = (Option<Uuid>, Option<Uuid>, i32, SwotCategory);

/// Stored bobot as a whole non-negative weight
fn weight(bobot: Option<f64>) -> u32 {
    let value = bobot.unwrap_or(0.0);
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = value.round().min(f64::from(u32::MAX)) as u32;
    rounded
}

#[async_trait]
impl MaintenanceJob for NormalizeSwotBobot {
    fn id(&self) -> &'static str {
        "normalize-swot-bobot"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "rescale swot_analisis.bobot to total 100 per unit, year and category"
    }

    async fn plan(&self, store: &dyn RowStore) -> Result<Vec<Change>, JobError> {
        let query = Query::new()
            .columns(&[
                "id",
                "organization_id",
                "unit_kerja_id",
                "tahun",
                "kategori",
                "bobot",
                "created_at",
            ])
            .order_asc("created_at")
            .order_asc("id");
        let rows = store.select(tables::SWOT_ANALISIS, &query).await?;

        let mut groups: BTreeMap<GroupKey, Vec<BobotRow>> = BTreeMap::new();
        for row in rows {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            let r = serde_json::from_value::<BobotRow>(Value::Object(row)).map_err(|e| {
                JobError::precondition(self.id(), format!("swot_analisis row {id} is unreadable: {e}"))
            })?;
            groups
                .entry((r.organization_id, r.unit_kerja_id, r.tahun, r.kategori))
                .or_default()
                .push(r);
        }

        let mut changes = Vec::new();
        for ((_, _, tahun, kategori), rows) in groups {
            let weights: Vec<u32> = rows.iter().map(|r| weight(r.bobot)).collect();
            let exact = rows
                .iter()
                .all(|r| r.bobot.is_some_and(|b| b.fract() == 0.0));
            if exact && weights.iter().sum::<u32>() == BOBOT_TOTAL {
                continue;
            }
            let normalized = normalize_weights(&weights, BOBOT_TOTAL, DEFAULT_FLOOR);
            for (row, new) in rows.iter().zip(normalized) {
                if row.bobot == Some(f64::from(new)) {
                    continue;
                }
                let mut patch = Row::new();
                patch.insert("bobot".into(), Value::from(new));
                changes.push(Change::Update {
                    table: tables::SWOT_ANALISIS,
                    id: row.id,
                    patch,
                    note: format!(
                        "{kategori} {tahun}: bobot {} -> {new}",
                        row.bobot.map_or_else(|| "null".to_string(), |b| b.to_string())
                    ),
                });
            }
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_rounds_and_clamps() {
        assert_eq!(weight(None), 0);
        assert_eq!(weight(Some(-3.0)), 0);
        assert_eq!(weight(Some(f64::NAN)), 0);
        assert_eq!(weight(Some(24.6)), 25);
        assert_eq!(weight(Some(40.0)), 40);
    }
}
