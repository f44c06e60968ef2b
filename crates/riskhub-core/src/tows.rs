//! TOWS strategy statements
//!
//! Strategies are either entered by hand or filled from a named template per
//! TOWS type, pairing the strongest internal factor with the strongest
//! external one.

use crate::error::ValidationError;
use crate::swot::SwotFactor;
use crate::types::{SwotCategory, TowsType};
use crate::validate::{lenient_datetime, Validate, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Stored TOWS strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowsStrategy {
    pub id: Uuid,
    pub tipe_strategi: TowsType,
    pub strategi: String,
    #[serde(default)]
    pub rencana_strategis_id: Option<Uuid>,
    #[serde(default)]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(default)]
    pub tahun: Option<i32>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for a strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TowsStrategyDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipe_strategi: Option<TowsType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rencana_strategis_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tahun: Option<i32>,
}

impl Validate for TowsStrategyDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .require("tipe_strategi", self.tipe_strategi.as_ref())
            .require_text("strategi", self.strategi.as_deref())
            .finish()
    }
}

/// A named fill-in template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowsTemplate {
    pub tipe: TowsType,
    pub name: &'static str,
    /// Text with `{internal}` and `{external}` placeholders
    pub pattern: &'static str,
}

impl TowsTemplate {
    /// Template for a type
    #[must_use]
    pub fn for_type(tipe: TowsType) -> &'static TowsTemplate {
        TEMPLATES
            .iter()
            .find(|t| t.tipe == tipe)
            .unwrap_or(&TEMPLATES[0])
    }

    /// Fill placeholders
    #[must_use]
    pub fn fill(&self, internal: &str, external: &str) -> String {
        self.pattern
            .replace("{internal}", internal.trim())
            .replace("{external}", external.trim())
    }
}

/// One template per TOWS type
pub const TEMPLATES: [TowsTemplate; 4] = [
    TowsTemplate {
        tipe: TowsType::StrengthOpportunity,
        name: "strategi-agresif",
        pattern: "Manfaatkan {internal} untuk meraih peluang {external}",
    },
    TowsTemplate {
        tipe: TowsType::WeaknessOpportunity,
        name: "strategi-turn-around",
        pattern: "Perbaiki {internal} dengan memanfaatkan peluang {external}",
    },
    TowsTemplate {
        tipe: TowsType::StrengthThreat,
        name: "strategi-diversifikasi",
        pattern: "Gunakan {internal} untuk menghadapi ancaman {external}",
    },
    TowsTemplate {
        tipe: TowsType::WeaknessThreat,
        name: "strategi-defensif",
        pattern: "Minimalkan {internal} untuk menghindari ancaman {external}",
    },
];

/// A strategy produced from templates, with the factors it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedStrategy {
    pub tipe_strategi: TowsType,
    pub template: &'static str,
    pub strategi: String,
    pub internal_factor_id: Uuid,
    pub external_factor_id: Uuid,
}

impl GeneratedStrategy {
    /// Convert into a draft ready for insertion
    #[must_use]
    pub fn into_draft(
        self,
        rencana_strategis_id: Option<Uuid>,
        unit_kerja_id: Option<Uuid>,
        tahun: Option<i32>,
    ) -> TowsStrategyDraft {
        TowsStrategyDraft {
            tipe_strategi: Some(self.tipe_strategi),
            strategi: Some(self.strategi),
            rencana_strategis_id,
            unit_kerja_id,
            tahun,
        }
    }
}

/// Strongest first: score, then bobot, then text
fn by_strength(a: &&SwotFactor, b: &&SwotFactor) -> Ordering {
    b.score()
        .cmp(&a.score())
        .then_with(|| b.bobot.cmp(&a.bobot))
        .then_with(|| a.objek_analisis.cmp(&b.objek_analisis))
}

fn top(factors: &[SwotFactor], kategori: SwotCategory, n: usize) -> Vec<&SwotFactor> {
    let mut picked: Vec<&SwotFactor> = factors.iter().filter(|f| f.kategori == kategori).collect();
    picked.sort_by(by_strength);
    picked.truncate(n);
    picked
}

/// Fill every template from the top `per_category` factors of each category
///
/// Produces up to `per_category²` strategies per TOWS type, in matrix order.
/// Types whose categories have no factors produce nothing.
#[must_use]
pub fn generate(factors: &[SwotFactor], per_category: usize) -> Vec<GeneratedStrategy> {
    let mut out = Vec::new();
    for tipe in TowsType::ALL {
        let (internal_cat, external_cat) = tipe.pair();
        let template = TowsTemplate::for_type(tipe);
        let internals = top(factors, internal_cat, per_category);
        let externals = top(factors, external_cat, per_category);
        for internal in &internals {
            for external in &externals {
                out.push(GeneratedStrategy {
                    tipe_strategi: tipe,
                    template: template.name,
                    strategi: template.fill(&internal.objek_analisis, &external.objek_analisis),
                    internal_factor_id: internal.id,
                    external_factor_id: external.id,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(kategori: SwotCategory, text: &str, bobot: u32, rank: u32) -> SwotFactor {
        SwotFactor {
            id: Uuid::new_v4(),
            kategori,
            objek_analisis: text.into(),
            bobot,
            rank,
            unit_kerja_id: None,
            tahun: 2025,
            rencana_strategis_id: None,
            organization_id: None,
            created_at: None,
        }
    }

    #[test]
    fn generates_one_per_type_from_strongest_factors() {
        let factors = vec![
            factor(SwotCategory::Strength, "dokter spesialis lengkap", 60, 4),
            factor(SwotCategory::Strength, "lokasi strategis", 40, 3),
            factor(SwotCategory::Weakness, "sistem informasi lama", 100, 3),
            factor(SwotCategory::Opportunity, "kerja sama BPJS", 100, 4),
            factor(SwotCategory::Threat, "RS pesaing baru", 100, 3),
        ];
        let out = generate(&factors, 1);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].tipe_strategi, TowsType::StrengthOpportunity);
        assert_eq!(
            out[0].strategi,
            "Manfaatkan dokter spesialis lengkap untuk meraih peluang kerja sama BPJS"
        );
        assert_eq!(out[3].tipe_strategi, TowsType::WeaknessThreat);
        assert_eq!(out[3].template, "strategi-defensif");
    }

    #[test]
    fn ties_break_on_bobot_then_text() {
        let factors = vec![
            factor(SwotCategory::Strength, "b", 50, 2),
            factor(SwotCategory::Strength, "a", 25, 4),
            factor(SwotCategory::Strength, "c", 50, 2),
            factor(SwotCategory::Opportunity, "o", 100, 1),
        ];
        let out = generate(&factors, 3);
        let so: Vec<&str> = out
            .iter()
            .filter(|s| s.tipe_strategi == TowsType::StrengthOpportunity)
            .map(|s| s.strategi.as_str())
            .collect();
        assert_eq!(
            so,
            vec![
                "Manfaatkan b untuk meraih peluang o",
                "Manfaatkan c untuk meraih peluang o",
                "Manfaatkan a untuk meraih peluang o",
            ]
        );
    }

    #[test]
    fn missing_category_produces_nothing_for_its_types() {
        let factors = vec![factor(SwotCategory::Strength, "s", 100, 3)];
        assert!(generate(&factors, 2).is_empty());
    }

    #[test]
    fn every_type_has_a_template() {
        for tipe in TowsType::ALL {
            assert_eq!(TowsTemplate::for_type(tipe).tipe, tipe);
        }
    }
}
