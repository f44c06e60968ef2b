//! Risk register records
//!
//! A risk (`risk_inputs`) is scored twice, before and after controls
//! (`risk_inherent_analysis` / `risk_residual_analysis`), and tracked through
//! mitigation (`risk_monitoring`). Scores are never stored: value and level
//! are derived from probability and impact whenever a row is presented.

use crate::error::ValidationError;
use crate::types::{MonitoringStatus, RiskLevel};
use crate::validate::{lenient_datetime, Validate, Validator};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Probability and impact scale bounds
pub const SCALE_MIN: u8 = 1;
/// Upper bound of the 5×5 matrix
pub const SCALE_MAX: u8 = 5;

/// One identified risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInput {
    pub id: Uuid,
    #[serde(default)]
    pub kode_risiko: Option<String>,
    pub sasaran: String,
    #[serde(default)]
    pub pemilik_risiko: Option<String>,
    #[serde(default)]
    pub kategori_risiko_id: Option<Uuid>,
    #[serde(default)]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(default)]
    pub rencana_strategis_id: Option<Uuid>,
    #[serde(default)]
    pub penyebab_risiko: Option<String>,
    #[serde(default)]
    pub dampak_risiko: Option<String>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for creating or replacing a risk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskInputDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kode_risiko: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sasaran: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pemilik_risiko: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kategori_risiko_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rencana_strategis_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penyebab_risiko: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dampak_risiko: Option<String>,
}

impl Validate for RiskInputDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .require_text("sasaran", self.sasaran.as_deref())
            .require_text("pemilik_risiko", self.pemilik_risiko.as_deref())
            .require("kategori_risiko_id", self.kategori_risiko_id.as_ref())
            .require("unit_kerja_id", self.unit_kerja_id.as_ref())
            .finish()
    }
}

/// Probability × impact pair on the 5×5 matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskScore {
    pub probability: u8,
    pub impact: u8,
}

impl RiskScore {
    /// Create a score, clamping both axes onto the matrix
    #[inline]
    #[must_use]
    pub fn new(probability: u8, impact: u8) -> Self {
        Self {
            probability: probability.clamp(SCALE_MIN, SCALE_MAX),
            impact: impact.clamp(SCALE_MIN, SCALE_MAX),
        }
    }

    /// Risk value (1..=25)
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.probability * self.impact
    }

    /// Risk level band
    #[inline]
    #[must_use]
    pub fn level(self) -> RiskLevel {
        RiskLevel::from_value(self.value())
    }
}

/// Inherent or residual analysis row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub id: Uuid,
    pub risk_input_id: Uuid,
    pub probability: u8,
    pub impact: u8,
    #[serde(default)]
    pub keterangan: Option<String>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RiskAnalysis {
    /// Score of this analysis
    #[inline]
    #[must_use]
    pub fn score(&self) -> RiskScore {
        RiskScore::new(self.probability, self.impact)
    }

    /// Attach derived value and level
    #[must_use]
    pub fn present(self) -> RiskAnalysisView {
        let score = self.score();
        RiskAnalysisView {
            risk_value: score.value(),
            risk_level: score.level(),
            analysis: self,
        }
    }
}

/// Analysis row as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysisView {
    #[serde(flatten)]
    pub analysis: RiskAnalysis,
    pub risk_value: u8,
    pub risk_level: RiskLevel,
}

/// Request body for an analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAnalysisDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_input_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keterangan: Option<String>,
}

impl Validate for RiskAnalysisDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let (min, max) = (i64::from(SCALE_MIN), i64::from(SCALE_MAX));
        Validator::new()
            .require("risk_input_id", self.risk_input_id.as_ref())
            .require("probability", self.probability.as_ref())
            .require("impact", self.impact.as_ref())
            .range("probability", self.probability, min, max)
            .range("impact", self.impact, min, max)
            .finish()
    }
}

/// Mitigation tracking row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMonitoring {
    pub id: Uuid,
    pub risk_input_id: Uuid,
    #[serde(default)]
    pub pemilik: Option<String>,
    pub rencana_mitigasi: String,
    #[serde(default)]
    pub tanggal_review: Option<NaiveDate>,
    #[serde(default)]
    pub tanggal_review_berikutnya: Option<NaiveDate>,
    #[serde(default)]
    pub status: MonitoringStatus,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RiskMonitoring {
    /// Next review date has passed and mitigation is not closed
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != MonitoringStatus::Closed
            && self.tanggal_review_berikutnya.is_some_and(|d| d < today)
    }

    /// Attach derived overdue flag
    #[must_use]
    pub fn present(self, today: NaiveDate) -> RiskMonitoringView {
        RiskMonitoringView {
            overdue: self.is_overdue(today),
            monitoring: self,
        }
    }
}

/// Monitoring row as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMonitoringView {
    #[serde(flatten)]
    pub monitoring: RiskMonitoring,
    pub overdue: bool,
}

/// Request body for a monitoring row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskMonitoringDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_input_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pemilik: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rencana_mitigasi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tanggal_review: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tanggal_review_berikutnya: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MonitoringStatus>,
}

impl Validate for RiskMonitoringDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require("risk_input_id", self.risk_input_id.as_ref())
            .require_text("rencana_mitigasi", self.rencana_mitigasi.as_deref());
        if let (Some(review), Some(next)) = (self.tanggal_review, self.tanggal_review_berikutnya) {
            if next < review {
                v.reject(
                    "tanggal_review_berikutnya",
                    "must not be before tanggal_review",
                );
            }
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(probability: u8, impact: u8) -> RiskAnalysis {
        RiskAnalysis {
            id: Uuid::new_v4(),
            risk_input_id: Uuid::new_v4(),
            probability,
            impact,
            keterangan: None,
            organization_id: None,
            created_at: None,
        }
    }

    #[test]
    fn analysis_view_derives_value_and_level() {
        let view = analysis(4, 5).present();
        assert_eq!(view.risk_value, 20);
        assert_eq!(view.risk_level, RiskLevel::Extreme);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["risk_value"], 20);
        assert_eq!(json["risk_level"], "extreme");
        assert_eq!(json["probability"], 4);
    }

    #[test]
    fn score_clamps_out_of_matrix_values() {
        let score = RiskScore::new(0, 9);
        assert_eq!(score.probability, 1);
        assert_eq!(score.impact, 5);
        assert_eq!(score.value(), 5);
    }

    #[test]
    fn analysis_draft_rejects_out_of_range() {
        let draft = RiskAnalysisDraft {
            risk_input_id: Some(Uuid::new_v4()),
            probability: Some(6),
            impact: Some(0),
            keterangan: None,
        };
        let err = draft.validate().unwrap_err();
        assert!(err.has_field("probability"));
        assert!(err.has_field("impact"));
    }

    #[test]
    fn risk_draft_requires_fields() {
        let err = RiskInputDraft::default().validate().unwrap_err();
        for field in ["sasaran", "pemilik_risiko", "kategori_risiko_id", "unit_kerja_id"] {
            assert!(err.has_field(field), "missing {field}");
        }
    }

    #[test]
    fn monitoring_overdue_only_when_open_and_past_due() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut m = RiskMonitoring {
            id: Uuid::new_v4(),
            risk_input_id: Uuid::new_v4(),
            pemilik: None,
            rencana_mitigasi: "Pelatihan ulang".into(),
            tanggal_review: None,
            tanggal_review_berikutnya: NaiveDate::from_ymd_opt(2024, 5, 1),
            status: MonitoringStatus::InProgress,
            organization_id: None,
            created_at: None,
        };
        assert!(m.is_overdue(today));

        m.status = MonitoringStatus::Closed;
        assert!(!m.is_overdue(today));

        m.status = MonitoringStatus::Open;
        m.tanggal_review_berikutnya = NaiveDate::from_ymd_opt(2024, 7, 1);
        assert!(!m.is_overdue(today));
    }

    #[test]
    fn monitoring_draft_rejects_reversed_dates() {
        let draft = RiskMonitoringDraft {
            risk_input_id: Some(Uuid::new_v4()),
            rencana_mitigasi: Some("Audit".into()),
            tanggal_review: NaiveDate::from_ymd_opt(2024, 5, 1),
            tanggal_review_berikutnya: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Default::default()
        };
        assert!(draft.validate().unwrap_err().has_field("tanggal_review_berikutnya"));
    }
}
