//! SWOT factors and their aggregation
//!
//! Score is derived as `bobot × rank` and never read back from storage.
//! Bobot is expected to total [`BOBOT_TOTAL`] per category within one work
//! unit and year:
//! - single-row writes may not push a category past the total
//! - bulk replacement must hit the total exactly
//! - the summary reports categories whose total is off

use crate::error::{InvariantError, ValidationError};
use crate::types::{SwotCategory, TowsType};
use crate::validate::{lenient_datetime, lenient_i32, lenient_u32, Validate, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Expected bobot total per category
pub const BOBOT_TOTAL: u32 = 100;
/// Rank bounds
pub const RANK_MIN: u32 = 1;
/// Upper rank bound
pub const RANK_MAX: u32 = 5;

/// One SWOT factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotFactor {
    pub id: Uuid,
    pub kategori: SwotCategory,
    pub objek_analisis: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub bobot: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub rank: u32,
    #[serde(default)]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(deserialize_with = "lenient_i32")]
    pub tahun: i32,
    #[serde(default)]
    pub rencana_strategis_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SwotFactor {
    /// Derived score
    #[inline]
    #[must_use]
    pub fn score(&self) -> u32 {
        self.bobot.saturating_mul(self.rank)
    }

    /// Attach the derived score
    #[must_use]
    pub fn present(self) -> SwotFactorView {
        SwotFactorView {
            score: self.score(),
            factor: self,
        }
    }

    /// Grouping key for the bobot invariant
    #[must_use]
    pub fn group_key(&self) -> BobotGroup {
        BobotGroup {
            organization_id: self.organization_id,
            unit_kerja_id: self.unit_kerja_id,
            tahun: self.tahun,
            kategori: self.kategori,
        }
    }
}

/// Factor as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwotFactorView {
    #[serde(flatten)]
    pub factor: SwotFactor,
    pub score: u32,
}

/// Scope in which bobot must total [`BOBOT_TOTAL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BobotGroup {
    pub organization_id: Option<Uuid>,
    pub unit_kerja_id: Option<Uuid>,
    pub tahun: i32,
    pub kategori: SwotCategory,
}

/// Request body for one factor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwotFactorDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kategori: Option<SwotCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objek_analisis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bobot: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_kerja_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tahun: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rencana_strategis_id: Option<Uuid>,
}

impl Validate for SwotFactorDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .require("kategori", self.kategori.as_ref())
            .require_text("objek_analisis", self.objek_analisis.as_deref())
            .require("bobot", self.bobot.as_ref())
            .require("rank", self.rank.as_ref())
            .require("unit_kerja_id", self.unit_kerja_id.as_ref())
            .require("tahun", self.tahun.as_ref())
            .range("bobot", self.bobot, 0, i64::from(BOBOT_TOTAL))
            .range("rank", self.rank, i64::from(RANK_MIN), i64::from(RANK_MAX))
            .range("tahun", self.tahun.map(i64::from), 2000, 2100)
            .finish()
    }
}

/// Bulk replacement of every factor in one category of a unit and year
#[derive(Debug, Clone, Deserialize)]
pub struct SwotBulkReplace {
    pub unit_kerja_id: Uuid,
    pub tahun: i32,
    pub kategori: SwotCategory,
    #[serde(default)]
    pub rencana_strategis_id: Option<Uuid>,
    pub factors: Vec<SwotBulkItem>,
}

/// One factor in a bulk replacement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwotBulkItem {
    pub objek_analisis: String,
    pub bobot: i64,
    pub rank: i64,
}

impl SwotBulkReplace {
    /// Turn the items into validated drafts
    ///
    /// # Errors
    /// Field errors are reported as `factors[i].<field>`.
    pub fn drafts(&self) -> Result<Vec<SwotFactorDraft>, ValidationError> {
        let mut v = Validator::new();
        let drafts: Vec<SwotFactorDraft> = self
            .factors
            .iter()
            .map(|item| SwotFactorDraft {
                kategori: Some(self.kategori),
                objek_analisis: Some(item.objek_analisis.clone()),
                bobot: Some(item.bobot),
                rank: Some(item.rank),
                unit_kerja_id: Some(self.unit_kerja_id),
                tahun: Some(self.tahun),
                rencana_strategis_id: self.rencana_strategis_id,
            })
            .collect();
        if drafts.is_empty() {
            v.reject("factors", "must not be empty");
        }
        for (i, draft) in drafts.iter().enumerate() {
            if let Err(e) = draft.validate() {
                for f in e.fields {
                    v.reject(&format!("factors[{i}].{}", f.field), f.message);
                }
            }
        }
        v.finish()?;
        Ok(drafts)
    }

    /// Check the replacement totals exactly [`BOBOT_TOTAL`]
    ///
    /// # Errors
    /// [`InvariantError::BobotNotExact`] otherwise.
    pub fn check_total(&self) -> Result<(), InvariantError> {
        let total: i64 = self.factors.iter().map(|f| f.bobot.max(0)).sum();
        if total == i64::from(BOBOT_TOTAL) {
            Ok(())
        } else {
            Err(InvariantError::BobotNotExact {
                kategori: self.kategori.to_string(),
                total: u32::try_from(total).unwrap_or(u32::MAX),
                expected: BOBOT_TOTAL,
            })
        }
    }
}

/// Check a single-row write keeps its category within [`BOBOT_TOTAL`]
///
/// `existing` are the factors already stored in the same group; `replacing`
/// is the id being updated (its current bobot is not counted twice).
///
/// # Errors
/// [`InvariantError::BobotExceeded`] when the new total would be too large.
pub fn check_bobot_capacity(
    existing: &[SwotFactor],
    replacing: Option<Uuid>,
    kategori: SwotCategory,
    new_bobot: u32,
) -> Result<(), InvariantError> {
    let current: u32 = existing
        .iter()
        .filter(|f| f.kategori == kategori && Some(f.id) != replacing)
        .fold(0u32, |acc, f| acc.saturating_add(f.bobot));
    let total = current.saturating_add(new_bobot);
    if total > BOBOT_TOTAL {
        return Err(InvariantError::BobotExceeded {
            kategori: kategori.to_string(),
            total,
            max: BOBOT_TOTAL,
        });
    }
    Ok(())
}

/// Per-category aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub kategori: SwotCategory,
    pub jumlah_faktor: usize,
    pub total_bobot: u32,
    pub total_score: u32,
    pub rank_min: Option<u32>,
    pub rank_max: Option<u32>,
    pub rank_rata_rata: Option<f64>,
    pub bobot_complete: bool,
}

impl CategorySummary {
    fn from_factors(kategori: SwotCategory, factors: &[&SwotFactor]) -> Self {
        let ranks = factors.iter().map(|f| f.rank);
        let total_bobot = factors
            .iter()
            .fold(0u32, |acc, f| acc.saturating_add(f.bobot));
        let rank_rata_rata = if factors.is_empty() {
            None
        } else {
            let sum: f64 = factors.iter().map(|f| f64::from(f.rank)).sum();
            Some(sum / factors.len() as f64)
        };
        Self {
            kategori,
            jumlah_faktor: factors.len(),
            total_bobot,
            total_score: factors
                .iter()
                .fold(0u32, |acc, f| acc.saturating_add(f.score())),
            rank_min: ranks.clone().min(),
            rank_max: ranks.max(),
            rank_rata_rata,
            bobot_complete: total_bobot == BOBOT_TOTAL,
        }
    }
}

/// Position on the SWOT cartesian diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrategicQuadrant {
    pub strategi: TowsType,
    pub nama: &'static str,
}

impl StrategicQuadrant {
    /// Quadrant for an (internal, external) coordinate; zero counts as positive
    #[must_use]
    pub fn locate(x: i64, y: i64) -> Self {
        let (strategi, nama) = match (x >= 0, y >= 0) {
            (true, true) => (TowsType::StrengthOpportunity, "Agresif"),
            (false, true) => (TowsType::WeaknessOpportunity, "Turn-around"),
            (false, false) => (TowsType::WeaknessThreat, "Defensif"),
            (true, false) => (TowsType::StrengthThreat, "Diversifikasi"),
        };
        Self { strategi, nama }
    }
}

/// Summary of one organization, work unit and year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwotGroupSummary {
    pub organization_id: Option<Uuid>,
    pub unit_kerja_id: Option<Uuid>,
    pub tahun: i32,
    pub categories: Vec<CategorySummary>,
    /// Strength score minus weakness score
    pub sumbu_x: i64,
    /// Opportunity score minus threat score
    pub sumbu_y: i64,
    pub kuadran: StrategicQuadrant,
}

impl SwotGroupSummary {
    /// Summary of one category
    #[must_use]
    pub fn category(&self, kategori: SwotCategory) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.kategori == kategori)
    }

    /// Every category totals [`BOBOT_TOTAL`]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.categories.iter().all(|c| c.bobot_complete)
    }
}

/// Group factors by (organization, work unit, year) and aggregate each category
///
/// Groups come back ordered by organization, work unit then year; every
/// group lists all four categories, empty ones included.
#[must_use]
pub fn summarize(factors: &[SwotFactor]) -> Vec<SwotGroupSummary> {
    type Key = (Option<Uuid>, Option<Uuid>, i32);
    let mut groups: BTreeMap<Key, Vec<&SwotFactor>> = BTreeMap::new();
    for f in factors {
        groups
            .entry((f.organization_id, f.unit_kerja_id, f.tahun))
            .or_default()
            .push(f);
    }

    groups
        .into_iter()
        .map(|((organization_id, unit_kerja_id, tahun), rows)| {
            let categories: Vec<CategorySummary> = SwotCategory::ALL
                .iter()
                .map(|&k| {
                    let in_cat: Vec<&SwotFactor> =
                        rows.iter().copied().filter(|f| f.kategori == k).collect();
                    CategorySummary::from_factors(k, &in_cat)
                })
                .collect();
            let score = |k: SwotCategory| {
                categories
                    .iter()
                    .find(|c| c.kategori == k)
                    .map_or(0, |c| i64::from(c.total_score))
            };
            let sumbu_x = score(SwotCategory::Strength) - score(SwotCategory::Weakness);
            let sumbu_y = score(SwotCategory::Opportunity) - score(SwotCategory::Threat);
            SwotGroupSummary {
                organization_id,
                unit_kerja_id,
                tahun,
                categories,
                sumbu_x,
                sumbu_y,
                kuadran: StrategicQuadrant::locate(sumbu_x, sumbu_y),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn factor(kategori: SwotCategory, bobot: u32, rank: u32, unit: Uuid) -> SwotFactor {
        SwotFactor {
            id: Uuid::new_v4(),
            kategori,
            objek_analisis: format!("{kategori} {bobot}"),
            bobot,
            rank,
            unit_kerja_id: Some(unit),
            tahun: 2025,
            rencana_strategis_id: None,
            organization_id: None,
            created_at: None,
        }
    }

    #[test]
    fn score_is_bobot_times_rank_and_ignores_stored_score() {
        let row = serde_json::json!({
            "id": Uuid::new_v4(),
            "kategori": "Strength",
            "objek_analisis": "SDM kompeten",
            "bobot": 30,
            "rank": 4,
            "score": 0,
            "tahun": 2025
        });
        let f: SwotFactor = serde_json::from_value(row).unwrap();
        let view = serde_json::to_value(f.present()).unwrap();
        assert_eq!(view["score"], 120);
    }

    #[test]
    fn summary_groups_and_locates_quadrant() {
        let unit = Uuid::new_v4();
        let factors = vec![
            factor(SwotCategory::Strength, 60, 4, unit),
            factor(SwotCategory::Strength, 40, 3, unit),
            factor(SwotCategory::Weakness, 100, 2, unit),
            factor(SwotCategory::Opportunity, 100, 3, unit),
            factor(SwotCategory::Threat, 70, 4, unit),
        ];
        let summary = summarize(&factors);
        assert_eq!(summary.len(), 1);
        let g = &summary[0];

        let s = g.category(SwotCategory::Strength).unwrap();
        assert_eq!(s.jumlah_faktor, 2);
        assert_eq!(s.total_bobot, 100);
        assert_eq!(s.total_score, 360);
        assert_eq!(s.rank_min, Some(3));
        assert_eq!(s.rank_max, Some(4));
        assert_eq!(s.rank_rata_rata, Some(3.5));
        assert!(s.bobot_complete);

        let t = g.category(SwotCategory::Threat).unwrap();
        assert!(!t.bobot_complete);
        assert!(!g.is_complete());

        assert_eq!(g.sumbu_x, 360 - 200);
        assert_eq!(g.sumbu_y, 300 - 280);
        assert_eq!(g.kuadran.strategi, TowsType::StrengthOpportunity);
    }

    #[test]
    fn empty_categories_are_listed() {
        let unit = Uuid::new_v4();
        let summary = summarize(&[factor(SwotCategory::Threat, 50, 2, unit)]);
        let g = &summary[0];
        assert_eq!(g.categories.len(), 4);
        let s = g.category(SwotCategory::Strength).unwrap();
        assert_eq!(s.jumlah_faktor, 0);
        assert_eq!(s.rank_rata_rata, None);
        assert_eq!(g.kuadran.strategi, TowsType::StrengthThreat);
    }

    #[test]
    fn summary_keeps_organizations_apart() {
        let unit = Uuid::new_v4();
        let (org_a, org_b) = (Uuid::from_u128(1), Uuid::from_u128(2));
        let mut a = factor(SwotCategory::Strength, 100, 3, unit);
        a.organization_id = Some(org_a);
        let mut b = factor(SwotCategory::Strength, 100, 2, unit);
        b.organization_id = Some(org_b);

        let summary = summarize(&[b, a]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].organization_id, Some(org_a));
        assert_eq!(summary[1].organization_id, Some(org_b));
        for g in &summary {
            let s = g.category(SwotCategory::Strength).unwrap();
            assert_eq!(s.total_bobot, 100);
            assert!(s.bobot_complete);
        }
        assert_eq!(summary[0].sumbu_x, 300);
    }

    #[test]
    fn oversized_legacy_bobot_saturates() {
        let unit = Uuid::new_v4();
        let huge = factor(SwotCategory::Opportunity, u32::MAX, 5, unit);
        assert_eq!(huge.score(), u32::MAX);
        let g = &summarize(&[huge.clone(), huge.clone()])[0];
        assert_eq!(g.category(SwotCategory::Opportunity).unwrap().total_bobot, u32::MAX);
        assert!(check_bobot_capacity(&[huge], None, SwotCategory::Opportunity, 10).is_err());
    }

    #[test]
    fn quadrant_boundaries() {
        assert_eq!(StrategicQuadrant::locate(0, 0).strategi, TowsType::StrengthOpportunity);
        assert_eq!(StrategicQuadrant::locate(-1, 0).strategi, TowsType::WeaknessOpportunity);
        assert_eq!(StrategicQuadrant::locate(-1, -1).strategi, TowsType::WeaknessThreat);
        assert_eq!(StrategicQuadrant::locate(0, -1).strategi, TowsType::StrengthThreat);
    }

    #[test]
    fn capacity_check_excludes_row_being_replaced() {
        let unit = Uuid::new_v4();
        let a = factor(SwotCategory::Strength, 60, 3, unit);
        let b = factor(SwotCategory::Strength, 40, 3, unit);
        let existing = vec![a.clone(), b];

        assert!(check_bobot_capacity(&existing, None, SwotCategory::Strength, 1).is_err());
        assert!(check_bobot_capacity(&existing, Some(a.id), SwotCategory::Strength, 60).is_ok());
        assert!(check_bobot_capacity(&existing, None, SwotCategory::Weakness, 100).is_ok());
    }

    #[test]
    fn bulk_replace_requires_exact_total() {
        let bulk = SwotBulkReplace {
            unit_kerja_id: Uuid::new_v4(),
            tahun: 2025,
            kategori: SwotCategory::Opportunity,
            rencana_strategis_id: None,
            factors: vec![
                SwotBulkItem { objek_analisis: "BPJS".into(), bobot: 50, rank: 4 },
                SwotBulkItem { objek_analisis: "Wisata medis".into(), bobot: 40, rank: 2 },
            ],
        };
        assert!(matches!(
            bulk.check_total(),
            Err(InvariantError::BobotNotExact { total: 90, .. })
        ));
        assert_eq!(bulk.drafts().unwrap().len(), 2);
    }

    #[test]
    fn bulk_replace_reports_indexed_fields() {
        let bulk = SwotBulkReplace {
            unit_kerja_id: Uuid::new_v4(),
            tahun: 2025,
            kategori: SwotCategory::Weakness,
            rencana_strategis_id: None,
            factors: vec![SwotBulkItem { objek_analisis: "x".into(), bobot: 100, rank: 9 }],
        };
        let err = bulk.drafts().unwrap_err();
        assert!(err.has_field("factors[0].rank"));
    }
}
