//! Risk register: risks joined with their analyses, monitoring and lookups
//!
//! The join runs in memory over rows fetched by separate selects. When a risk
//! has several analyses or monitoring rows, the most recent one wins (by
//! `created_at`, rows without a timestamp losing to stamped ones).

use crate::master::{find_by_id, RiskCategory, WorkUnit};
use crate::risk::{RiskAnalysis, RiskInput, RiskMonitoring};
use crate::types::{MonitoringStatus, RiskLevel};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Anything attached to a risk and timestamped
pub trait RiskAttachment {
    /// Owning risk
    fn risk_input_id(&self) -> Uuid;
    /// Creation time
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl RiskAttachment for RiskAnalysis {
    fn risk_input_id(&self) -> Uuid {
        self.risk_input_id
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl RiskAttachment for RiskMonitoring {
    fn risk_input_id(&self) -> Uuid {
        self.risk_input_id
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Most recent attachment per risk
#[must_use]
pub fn latest_per_risk<T: RiskAttachment>(rows: &[T]) -> HashMap<Uuid, &T> {
    let mut latest: HashMap<Uuid, &T> = HashMap::new();
    for row in rows {
        latest
            .entry(row.risk_input_id())
            .and_modify(|current| {
                if row.created_at() >= current.created_at() {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    latest
}

/// One flattened register line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRow {
    pub id: Uuid,
    pub kode_risiko: String,
    pub sasaran: String,
    pub pemilik_risiko: String,
    pub unit_kerja: String,
    pub kategori: String,
    pub inherent_value: Option<u8>,
    pub inherent_level: Option<RiskLevel>,
    pub residual_value: Option<u8>,
    pub residual_level: Option<RiskLevel>,
    pub status_monitoring: Option<MonitoringStatus>,
    pub rencana_mitigasi: Option<String>,
    pub tanggal_review_berikutnya: Option<NaiveDate>,
    pub overdue: bool,
}

/// Everything the register join reads
#[derive(Debug, Clone, Copy)]
pub struct RegisterSources<'a> {
    pub risks: &'a [RiskInput],
    pub inherent: &'a [RiskAnalysis],
    pub residual: &'a [RiskAnalysis],
    pub monitoring: &'a [RiskMonitoring],
    pub work_units: &'a [WorkUnit],
    pub categories: &'a [RiskCategory],
}

/// Build the register, ordered by risk code then objective
#[must_use]
pub fn build_register(src: RegisterSources<'_>, today: NaiveDate) -> Vec<RegisterRow> {
    let inherent = latest_per_risk(src.inherent);
    let residual = latest_per_risk(src.residual);
    let monitoring = latest_per_risk(src.monitoring);

    let mut rows: Vec<RegisterRow> = src
        .risks
        .iter()
        .map(|risk| {
            let inh = inherent.get(&risk.id).map(|a| a.score());
            let res = residual.get(&risk.id).map(|a| a.score());
            let mon = monitoring.get(&risk.id);
            RegisterRow {
                id: risk.id,
                kode_risiko: risk.kode_risiko.clone().unwrap_or_default(),
                sasaran: risk.sasaran.clone(),
                pemilik_risiko: risk.pemilik_risiko.clone().unwrap_or_default(),
                unit_kerja: find_by_id(src.work_units, risk.unit_kerja_id, |u| u.id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
                kategori: find_by_id(src.categories, risk.kategori_risiko_id, |c| c.id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                inherent_value: inh.map(|s| s.value()),
                inherent_level: inh.map(|s| s.level()),
                residual_value: res.map(|s| s.value()),
                residual_level: res.map(|s| s.level()),
                status_monitoring: mon.map(|m| m.status),
                rencana_mitigasi: mon.map(|m| m.rencana_mitigasi.clone()),
                tanggal_review_berikutnya: mon.and_then(|m| m.tanggal_review_berikutnya),
                overdue: mon.is_some_and(|m| m.is_overdue(today)),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.kode_risiko
            .cmp(&b.kode_risiko)
            .then_with(|| a.sasaran.cmp(&b.sasaran))
    });
    rows
}
