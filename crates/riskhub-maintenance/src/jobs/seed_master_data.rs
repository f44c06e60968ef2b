use crate::error::JobError;
use crate::job::{Change, MaintenanceJob};
use async_trait::async_trait;
use riskhub_core::{tables, to_row, RiskCategoryDraft, WorkUnitDraft};
use riskhub_store::{Query, RowStore};
use serde_json::Value;
use std::collections::HashSet;

/// Default work units: (code, name, jenis, kategori)
pub const DEFAULT_WORK_UNITS: &[(&str, &str, &str, &str)] = &[
    ("IGD", "Instalasi Gawat Darurat", "instalasi", "pelayanan medis"),
    ("IRJ", "Instalasi Rawat Jalan", "instalasi", "pelayanan medis"),
    ("IRNA", "Instalasi Rawat Inap", "instalasi", "pelayanan medis"),
    ("ICU", "Intensive Care Unit", "instalasi", "pelayanan medis"),
    ("IBS", "Instalasi Bedah Sentral", "instalasi", "pelayanan medis"),
    ("FAR", "Instalasi Farmasi", "instalasi", "penunjang medis"),
    ("LAB", "Instalasi Laboratorium", "instalasi", "penunjang medis"),
    ("RAD", "Instalasi Radiologi", "instalasi", "penunjang medis"),
    ("KEU", "Bagian Keuangan", "bagian", "manajemen"),
    ("SDM", "Bagian Sumber Daya Manusia", "bagian", "manajemen"),
    ("SPI", "Satuan Pengawas Internal", "satuan", "manajemen"),
];

/// Default risk categories: (name, description)
pub const DEFAULT_RISK_CATEGORIES: &[(&str, &str)] = &[
    ("Klinis", "Risiko pelayanan klinis dan keselamatan pasien"),
    ("Keuangan", "Risiko anggaran, pendapatan dan klaim"),
    ("Operasional", "Risiko proses, fasilitas dan sistem"),
    ("Strategis", "Risiko pencapaian rencana strategis"),
    ("Kepatuhan", "Risiko regulasi, akreditasi dan hukum"),
    ("Reputasi", "Risiko citra dan kepercayaan publik"),
];

/// Insert default work units and risk categories missing by code or name
pub struct SeedMasterData;

/// Lower-cased values of one text column
async fn existing(
    store: &dyn RowStore,
    table: &str,
    column: &str,
) -> Result<HashSet<String>, JobError> {
    Ok(store
        .select(table, &Query::new().columns(&[column]))
        .await?
        .iter()
        .filter_map(|row| row.get(column).and_then(Value::as_str))
        .map(|v| v.trim().to_lowercase())
        .collect())
}

#[async_trait]
impl MaintenanceJob for SeedMasterData {
    fn id(&self) -> &'static str {
        "seed-master-data"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "insert default work units and risk categories"
    }

    async fn plan(&self, store: &dyn RowStore) -> Result<Vec<Change>, JobError> {
        let codes = existing(store, tables::WORK_UNITS, "code").await?;
        let names = existing(store, tables::RISK_CATEGORIES, "name").await?;
        let mut changes = Vec::new();

        for &(code, name, jenis, kategori) in DEFAULT_WORK_UNITS {
            if codes.contains(&code.to_lowercase()) {
                continue;
            }
            let draft = WorkUnitDraft {
                name: Some(name.to_string()),
                code: Some(code.to_string()),
                jenis: Some(jenis.to_string()),
                kategori: Some(kategori.to_string()),
            };
            changes.push(Change::Insert {
                table: tables::WORK_UNITS,
                row: to_row(&draft)?,
                note: format!("work unit {code} {name}"),
            });
        }

        for &(name, description) in DEFAULT_RISK_CATEGORIES {
            if names.contains(&name.to_lowercase()) {
                continue;
            }
            let draft = RiskCategoryDraft {
                name: Some(name.to_string()),
                description: Some(description.to_string()),
            };
            changes.push(Change::Insert {
                table: tables::RISK_CATEGORIES,
                row: to_row(&draft)?,
                note: format!("risk category {name}"),
            });
        }
        Ok(changes)
    }
}
