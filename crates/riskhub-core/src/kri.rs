//! Key risk indicators

use crate::error::ValidationError;
use crate::types::{KriDirection, KriStatus};
use crate::validate::{lenient_datetime, Validate, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored indicator with its thresholds and latest reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRiskIndicator {
    pub id: Uuid,
    pub kode: String,
    pub nama_indikator: String,
    #[serde(default)]
    pub risk_input_id: Option<Uuid>,
    #[serde(default)]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(default)]
    pub satuan: Option<String>,
    #[serde(default)]
    pub arah: KriDirection,
    pub batas_aman: f64,
    pub batas_hati_hati: f64,
    #[serde(default)]
    pub nilai_aktual: Option<f64>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl KeyRiskIndicator {
    /// Status of the latest reading
    #[must_use]
    pub fn status(&self) -> KriStatus {
        match self.nilai_aktual {
            None => KriStatus::BelumDiukur,
            Some(v) => classify(self.arah, self.batas_aman, self.batas_hati_hati, v),
        }
    }

    /// Attach derived status
    #[must_use]
    pub fn present(self) -> KriView {
        KriView {
            status: self.status(),
            kri: self,
        }
    }
}

/// Classify a reading against safe and caution thresholds
#[must_use]
pub fn classify(arah: KriDirection, aman: f64, hati_hati: f64, value: f64) -> KriStatus {
    let (within_safe, within_caution) = match arah {
        KriDirection::HigherIsWorse => (value <= aman, value <= hati_hati),
        KriDirection::LowerIsWorse => (value >= aman, value >= hati_hati),
    };
    if within_safe {
        KriStatus::Aman
    } else if within_caution {
        KriStatus::HatiHati
    } else {
        KriStatus::Kritis
    }
}

/// Indicator as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KriView {
    #[serde(flatten)]
    pub kri: KeyRiskIndicator,
    pub status: KriStatus,
}

/// Request body for an indicator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KriDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nama_indikator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_input_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satuan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arah: Option<KriDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batas_aman: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batas_hati_hati: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nilai_aktual: Option<f64>,
}

impl Validate for KriDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require_text("kode", self.kode.as_deref())
            .require_text("nama_indikator", self.nama_indikator.as_deref())
            .require("batas_aman", self.batas_aman.as_ref())
            .require("batas_hati_hati", self.batas_hati_hati.as_ref());
        if let (Some(aman), Some(hati)) = (self.batas_aman, self.batas_hati_hati) {
            let ordered = match self.arah.unwrap_or_default() {
                KriDirection::HigherIsWorse => aman <= hati,
                KriDirection::LowerIsWorse => aman >= hati,
            };
            if !ordered {
                v.reject("batas_hati_hati", "must lie beyond batas_aman in the direction of arah");
            }
        }
        v.finish()
    }
}
