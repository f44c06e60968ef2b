//! Dashboard aggregates
//!
//! Everything here is computed from rows already fetched for the caller's
//! organization. Levels and values use the most recent analysis per risk.

use crate::kri::KeyRiskIndicator;
use crate::master::WorkUnit;
use crate::register::latest_per_risk;
use crate::risk::{RiskAnalysis, RiskInput, RiskMonitoring};
use crate::swot::SwotFactor;
use crate::types::{KriStatus, MonitoringStatus, RiskLevel};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Min, max and mean of risk values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueStats {
    pub min: u8,
    pub max: u8,
    pub avg: f64,
}

/// Risk counts per level, plus value statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub extreme: usize,
    pub stats: Option<ValueStats>,
}

impl LevelBreakdown {
    fn from_analyses(analyses: &[RiskAnalysis]) -> Self {
        let latest = latest_per_risk(analyses);
        let mut out = Self::default();
        let mut values: Vec<u8> = Vec::with_capacity(latest.len());
        for analysis in latest.values() {
            let score = analysis.score();
            values.push(score.value());
            match score.level() {
                RiskLevel::Low => out.low += 1,
                RiskLevel::Medium => out.medium += 1,
                RiskLevel::High => out.high += 1,
                RiskLevel::Extreme => out.extreme += 1,
            }
        }
        if let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) {
            let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
            out.stats = Some(ValueStats {
                min,
                max,
                avg: f64::from(sum) / values.len() as f64,
            });
        }
        out
    }

    /// Count for a level
    #[must_use]
    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Extreme => self.extreme,
        }
    }

    /// Number of risks with an analysis
    #[must_use]
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.extreme
    }
}

/// Risks per work unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCount {
    pub unit_kerja_id: Option<Uuid>,
    pub nama: String,
    pub jumlah: usize,
}

/// Monitoring rows by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitoringCounts {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
    pub overdue: usize,
}

/// Indicators by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KriCounts {
    pub aman: usize,
    pub hati_hati: usize,
    pub kritis: usize,
    pub belum_diukur: usize,
}

/// Body of `GET /api/dashboard`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_risiko: usize,
    pub inherent: LevelBreakdown,
    pub residual: LevelBreakdown,
    pub per_unit_kerja: Vec<UnitCount>,
    pub monitoring: MonitoringCounts,
    pub kri: KriCounts,
    pub total_faktor_swot: usize,
}

/// Rows the dashboard is computed from
#[derive(Debug, Clone, Copy)]
pub struct DashboardSources<'a> {
    pub risks: &'a [RiskInput],
    pub inherent: &'a [RiskAnalysis],
    pub residual: &'a [RiskAnalysis],
    pub monitoring: &'a [RiskMonitoring],
    pub kri: &'a [KeyRiskIndicator],
    pub swot: &'a [SwotFactor],
    pub work_units: &'a [WorkUnit],
}

/// Compute the dashboard
///
/// Units are listed by descending risk count, then name. Risks without a
/// unit are grouped under an empty name.
#[must_use]
pub fn summarize(src: DashboardSources<'_>, today: NaiveDate) -> DashboardSummary {
    let mut per_unit: BTreeMap<Option<Uuid>, usize> = BTreeMap::new();
    for risk in src.risks {
        *per_unit.entry(risk.unit_kerja_id).or_default() += 1;
    }
    let mut per_unit_kerja: Vec<UnitCount> = per_unit
        .into_iter()
        .map(|(unit_kerja_id, jumlah)| UnitCount {
            nama: unit_kerja_id
                .and_then(|id| src.work_units.iter().find(|u| u.id == id))
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            unit_kerja_id,
            jumlah,
        })
        .collect();
    per_unit_kerja.sort_by(|a, b| b.jumlah.cmp(&a.jumlah).then_with(|| a.nama.cmp(&b.nama)));

    let mut monitoring = MonitoringCounts::default();
    for m in src.monitoring {
        match m.status {
            MonitoringStatus::Open => monitoring.open += 1,
            MonitoringStatus::InProgress => monitoring.in_progress += 1,
            MonitoringStatus::Closed => monitoring.closed += 1,
        }
        if m.is_overdue(today) {
            monitoring.overdue += 1;
        }
    }

    let mut kri = KriCounts::default();
    for k in src.kri {
        match k.status() {
            KriStatus::Aman => kri.aman += 1,
            KriStatus::HatiHati => kri.hati_hati += 1,
            KriStatus::Kritis => kri.kritis += 1,
            KriStatus::BelumDiukur => kri.belum_diukur += 1,
        }
    }

    DashboardSummary {
        total_risiko: src.risks.len(),
        inherent: LevelBreakdown::from_analyses(src.inherent),
        residual: LevelBreakdown::from_analyses(src.residual),
        per_unit_kerja,
        monitoring,
        kri,
        total_faktor_swot: src.swot.len(),
    }
}
