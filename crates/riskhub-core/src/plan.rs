//! Strategic plans (rencana strategis) and their embedded KPIs

use crate::error::ValidationError;
use crate::types::PlanStatus;
use crate::validate::{lenient_datetime, Validate, Validator};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key performance indicator embedded in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub nama: String,
    pub target: f64,
    #[serde(default)]
    pub realisasi: Option<f64>,
    #[serde(default)]
    pub satuan: Option<String>,
}

impl Kpi {
    /// Achievement percentage; undefined without a reading or with a zero target
    #[must_use]
    pub fn capaian_persen(&self) -> Option<f64> {
        let realisasi = self.realisasi?;
        if self.target == 0.0 {
            return None;
        }
        Some(realisasi / self.target * 100.0)
    }
}

/// KPI with derived achievement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiProgress {
    #[serde(flatten)]
    pub kpi: Kpi,
    pub capaian_persen: Option<f64>,
}

/// Stored plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RencanaStrategis {
    pub id: Uuid,
    pub kode: String,
    pub nama: String,
    #[serde(default)]
    pub target: Option<String>,
    pub periode_mulai: NaiveDate,
    pub periode_selesai: NaiveDate,
    #[serde(default)]
    pub sasaran_strategis: Vec<String>,
    #[serde(default)]
    pub indikator_kinerja_utama: Vec<Kpi>,
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RencanaStrategis {
    /// Attach KPI achievement and its mean
    #[must_use]
    pub fn present(self) -> RencanaStrategisView {
        let kpi: Vec<KpiProgress> = self
            .indikator_kinerja_utama
            .iter()
            .cloned()
            .map(|k| KpiProgress {
                capaian_persen: k.capaian_persen(),
                kpi: k,
            })
            .collect();
        let measured: Vec<f64> = kpi.iter().filter_map(|k| k.capaian_persen).collect();
        let rata_rata_capaian = if measured.is_empty() {
            None
        } else {
            Some(measured.iter().sum::<f64>() / measured.len() as f64)
        };
        RencanaStrategisView {
            plan: self,
            kpi,
            rata_rata_capaian,
        }
    }

    /// The plan period covers `date`
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.periode_mulai <= date && date <= self.periode_selesai
    }
}

/// Plan as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RencanaStrategisView {
    #[serde(flatten)]
    pub plan: RencanaStrategis,
    pub kpi: Vec<KpiProgress>,
    pub rata_rata_capaian: Option<f64>,
}

/// Request body for a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RencanaStrategisDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nama: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periode_mulai: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periode_selesai: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sasaran_strategis: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indikator_kinerja_utama: Option<Vec<Kpi>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
}

impl Validate for RencanaStrategisDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require_text("kode", self.kode.as_deref())
            .require_text("nama", self.nama.as_deref())
            .require("periode_mulai", self.periode_mulai.as_ref())
            .require("periode_selesai", self.periode_selesai.as_ref());
        if let (Some(start), Some(end)) = (self.periode_mulai, self.periode_selesai) {
            if end < start {
                v.reject("periode_selesai", "must not be before periode_mulai");
            }
        }
        for (i, kpi) in self.indikator_kinerja_utama.iter().flatten().enumerate() {
            if kpi.nama.trim().is_empty() {
                v.reject(&format!("indikator_kinerja_utama[{i}].nama"), "must not be blank");
            }
            if !kpi.target.is_finite() {
                v.reject(&format!("indikator_kinerja_utama[{i}].target"), "must be a number");
            }
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(kpis: Vec<Kpi>) -> RencanaStrategis {
        RencanaStrategis {
            id: Uuid::new_v4(),
            kode: "RS-2025".into(),
            nama: "Renstra 2025-2029".into(),
            target: None,
            periode_mulai: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            periode_selesai: NaiveDate::from_ymd_opt(2029, 12, 31).unwrap(),
            sasaran_strategis: vec!["Mutu layanan".into()],
            indikator_kinerja_utama: kpis,
            status: PlanStatus::Aktif,
            organization_id: None,
            created_at: None,
        }
    }

    fn kpi(target: f64, realisasi: Option<f64>) -> Kpi {
        Kpi {
            nama: "BOR".into(),
            target,
            realisasi,
            satuan: Some("%".into()),
        }
    }

    #[test]
    fn achievement_is_derived_per_kpi() {
        let view = plan(vec![kpi(80.0, Some(60.0)), kpi(0.0, Some(5.0)), kpi(10.0, None)]).present();
        assert_eq!(view.kpi[0].capaian_persen, Some(75.0));
        assert_eq!(view.kpi[1].capaian_persen, None);
        assert_eq!(view.kpi[2].capaian_persen, None);
        assert_eq!(view.rata_rata_capaian, Some(75.0));
    }

    #[test]
    fn embedded_arrays_default_when_absent() {
        let row = serde_json::json!({
            "id": Uuid::new_v4(),
            "kode": "RS-1",
            "nama": "Renstra",
            "periode_mulai": "2025-01-01",
            "periode_selesai": "2025-12-31"
        });
        let p: RencanaStrategis = serde_json::from_value(row).unwrap();
        assert!(p.indikator_kinerja_utama.is_empty());
        assert_eq!(p.status, PlanStatus::Draft);
        assert!(p.covers(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
    }

    #[test]
    fn draft_rejects_reversed_period() {
        let draft = RencanaStrategisDraft {
            kode: Some("RS".into()),
            nama: Some("Renstra".into()),
            periode_mulai: NaiveDate::from_ymd_opt(2026, 1, 1),
            periode_selesai: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };
        assert!(draft.validate().unwrap_err().has_field("periode_selesai"));
    }
}
