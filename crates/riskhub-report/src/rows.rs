//! Record-to-row mapping for each template

use crate::template::Cell;
use chrono::NaiveDate;
use riskhub_core::master::find_by_id;
use riskhub_core::{KeyRiskIndicator, RegisterRow, RiskInput, RiskMonitoring, SwotFactor, WorkUnit};

fn date(d: Option<NaiveDate>) -> Cell {
    d.map(|d| d.format("%Y-%m-%d").to_string()).into()
}

/// Rows for the risk register report
#[must_use]
pub fn risk_register(rows: &[RegisterRow]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|r| {
            vec![
                Cell::from(r.kode_risiko.as_str()),
                r.sasaran.as_str().into(),
                r.pemilik_risiko.as_str().into(),
                r.unit_kerja.as_str().into(),
                r.kategori.as_str().into(),
                r.inherent_value.map(u32::from).into(),
                r.inherent_level.map(|l| l.label()).into(),
                r.residual_value.map(u32::from).into(),
                r.residual_level.map(|l| l.label()).into(),
                r.status_monitoring.map(|s| s.label()).into(),
                date(r.tanggal_review_berikutnya),
            ]
        })
        .collect()
}

/// Rows for the SWOT report, ordered by year, unit, category, then score
#[must_use]
pub fn swot(factors: &[SwotFactor], work_units: &[WorkUnit]) -> Vec<Vec<Cell>> {
    let mut sorted: Vec<&SwotFactor> = factors.iter().collect();
    sorted.sort_by(|a, b| {
        a.tahun
            .cmp(&b.tahun)
            .then_with(|| a.unit_kerja_id.cmp(&b.unit_kerja_id))
            .then_with(|| a.kategori.cmp(&b.kategori))
            .then_with(|| b.score().cmp(&a.score()))
    });
    sorted
        .into_iter()
        .map(|f| {
            let unit = find_by_id(work_units, f.unit_kerja_id, |u| u.id).map(|u| u.name.as_str());
            vec![
                Cell::Number(f64::from(f.tahun)),
                unit.into(),
                f.kategori.as_str().into(),
                f.objek_analisis.as_str().into(),
                f.bobot.into(),
                f.rank.into(),
                f.score().into(),
            ]
        })
        .collect()
}

/// Rows for the KRI report
#[must_use]
pub fn kri(indicators: &[KeyRiskIndicator]) -> Vec<Vec<Cell>> {
    indicators
        .iter()
        .map(|k| {
            vec![
                Cell::from(k.kode.as_str()),
                k.nama_indikator.as_str().into(),
                k.satuan.as_deref().into(),
                k.batas_aman.into(),
                k.batas_hati_hati.into(),
                k.nilai_aktual.into(),
                k.status().label().into(),
            ]
        })
        .collect()
}

/// Rows for the monitoring report
#[must_use]
pub fn monitoring(
    rows: &[RiskMonitoring],
    risks: &[RiskInput],
    today: NaiveDate,
) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|m| {
            let kode = find_by_id(risks, Some(m.risk_input_id), |r| r.id)
                .and_then(|r| r.kode_risiko.as_deref());
            vec![
                Cell::from(kode),
                m.pemilik.as_deref().into(),
                m.rencana_mitigasi.as_str().into(),
                date(m.tanggal_review),
                date(m.tanggal_review_berikutnya),
                m.status.label().into(),
                Cell::from(if m.is_overdue(today) { "Ya" } else { "Tidak" }),
            ]
        })
        .collect()
}
