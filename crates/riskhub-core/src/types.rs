//! Shared enumerations
//!
//! Defines the closed vocabularies used across the domain:
//! - User roles and what they may do
//! - Risk levels and the scoring bands that produce them
//! - SWOT categories and TOWS strategy types
//! - Monitoring and KRI statuses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller role, read from the `user_profiles` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Read-only access to own organization
    Viewer,
    /// Create and update within own organization
    User,
    /// Also delete within own organization
    Manager,
    /// Also maintain master data
    Admin,
    /// Every organization
    Superadmin,
}

impl UserRole {
    /// May create and update organization rows
    #[inline]
    #[must_use]
    pub fn can_write(self) -> bool {
        self >= Self::User
    }

    /// May delete organization rows
    #[inline]
    #[must_use]
    pub fn can_delete(self) -> bool {
        self >= Self::Manager
    }

    /// May write master (lookup) tables
    #[inline]
    #[must_use]
    pub fn can_manage_master(self) -> bool {
        self >= Self::Admin
    }

    /// Sees rows of every organization
    #[inline]
    #[must_use]
    pub fn is_global(self) -> bool {
        self == Self::Superadmin
    }
}

/// Risk level band for a probability × impact value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// 1..=4
    Low,
    /// 5..=9
    Medium,
    /// 10..=15
    High,
    /// 16..=25
    Extreme,
}

impl RiskLevel {
    /// All levels, lowest first
    pub const ALL: [RiskLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Extreme];

    /// Band a risk value
    #[must_use]
    pub fn from_value(value: u8) -> Self {
        match value {
            0..=4 => Self::Low,
            5..=9 => Self::Medium,
            10..=15 => Self::High,
            _ => Self::Extreme,
        }
    }

    /// Label used on screens and reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Rendah",
            Self::Medium => "Sedang",
            Self::High => "Tinggi",
            Self::Extreme => "Sangat Tinggi",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// SWOT factor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SwotCategory {
    /// Internal, positive
    Strength,
    /// Internal, negative
    Weakness,
    /// External, positive
    Opportunity,
    /// External, negative
    Threat,
}

impl SwotCategory {
    /// All categories in display order
    pub const ALL: [SwotCategory; 4] = [
        Self::Strength,
        Self::Weakness,
        Self::Opportunity,
        Self::Threat,
    ];

    /// Category name as stored
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Weakness => "Weakness",
            Self::Opportunity => "Opportunity",
            Self::Threat => "Threat",
        }
    }

    /// Internal factors are strengths and weaknesses
    #[inline]
    #[must_use]
    pub fn is_internal(self) -> bool {
        matches!(self, Self::Strength | Self::Weakness)
    }
}

impl fmt::Display for SwotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TOWS strategy type (pairing of an internal and an external category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TowsType {
    /// Strength × Opportunity
    #[serde(rename = "SO")]
    StrengthOpportunity,
    /// Weakness × Opportunity
    #[serde(rename = "WO")]
    WeaknessOpportunity,
    /// Strength × Threat
    #[serde(rename = "ST")]
    StrengthThreat,
    /// Weakness × Threat
    #[serde(rename = "WT")]
    WeaknessThreat,
}

impl TowsType {
    /// All types in matrix order
    pub const ALL: [TowsType; 4] = [
        Self::StrengthOpportunity,
        Self::WeaknessOpportunity,
        Self::StrengthThreat,
        Self::WeaknessThreat,
    ];

    /// Short code as stored
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::StrengthOpportunity => "SO",
            Self::WeaknessOpportunity => "WO",
            Self::StrengthThreat => "ST",
            Self::WeaknessThreat => "WT",
        }
    }

    /// Categories paired by this type (internal, external)
    #[must_use]
    pub fn pair(self) -> (SwotCategory, SwotCategory) {
        match self {
            Self::StrengthOpportunity => (SwotCategory::Strength, SwotCategory::Opportunity),
            Self::WeaknessOpportunity => (SwotCategory::Weakness, SwotCategory::Opportunity),
            Self::StrengthThreat => (SwotCategory::Strength, SwotCategory::Threat),
            Self::WeaknessThreat => (SwotCategory::Weakness, SwotCategory::Threat),
        }
    }
}

impl fmt::Display for TowsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mitigation tracking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringStatus {
    /// Mitigation not started
    #[default]
    Open,
    /// Mitigation under way
    InProgress,
    /// Residual risk accepted or mitigated
    Closed,
}

impl MonitoringStatus {
    /// Label used on screens and reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Terbuka",
            Self::InProgress => "Dalam Proses",
            Self::Closed => "Selesai",
        }
    }
}

/// Which direction of a KRI reading is bad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KriDirection {
    /// Larger readings are worse (e.g. infection rate)
    #[default]
    HigherIsWorse,
    /// Smaller readings are worse (e.g. hand-hygiene compliance)
    LowerIsWorse,
}

/// KRI status derived from thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KriStatus {
    /// Within the safe threshold
    Aman,
    /// Past safe but within caution
    HatiHati,
    /// Past caution
    Kritis,
    /// No reading yet
    BelumDiukur,
}

impl KriStatus {
    /// Label used on screens and reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Aman => "Aman",
            Self::HatiHati => "Hati-hati",
            Self::Kritis => "Kritis",
            Self::BelumDiukur => "Belum Diukur",
        }
    }
}

/// Strategic plan lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Being drafted
    #[default]
    Draft,
    /// In force
    Aktif,
    /// Period finished
    Selesai,
}
