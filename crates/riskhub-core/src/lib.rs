//! RiskHub Core - hospital risk management domain
//!
//! Records and the values derived from them:
//! - Risk register rows, inherent/residual scoring and monitoring
//! - SWOT factors, the bobot invariant and the strategic quadrant
//! - TOWS strategies and their templates
//! - Strategic plans with KPI achievement, and key risk indicators
//! - Dashboard and register aggregation
//!
//! Nothing derived is ever persisted. Records are decoded from store rows
//! and presented through `*View` types that carry the computed fields.
//!
//! # Example
//!
//! ```rust
//! use riskhub_core::{RiskLevel, RiskScore, StrategicQuadrant, TowsType};
//!
//! let score = RiskScore::new(4, 4);
//! assert_eq!(score.value(), 16);
//! assert_eq!(score.level(), RiskLevel::Extreme);
//!
//! let q = StrategicQuadrant::locate(120, -30);
//! assert_eq!(q.strategi, TowsType::StrengthThreat);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod dashboard;
pub mod error;
pub mod kri;
pub mod master;
pub mod normalize;
pub mod plan;
pub mod register;
pub mod risk;
pub mod swot;
pub mod tables;
pub mod tows;
pub mod types;
pub mod validate;

// Re-exports for convenience
pub use dashboard::{DashboardSources, DashboardSummary, LevelBreakdown};
pub use error::{CoreError, FieldError, InvariantError, ValidationError};
pub use kri::{KeyRiskIndicator, KriDraft, KriView};
pub use master::{RiskCategory, RiskCategoryDraft, UserProfile, WorkUnit, WorkUnitDraft};
pub use normalize::normalize_weights;
pub use plan::{Kpi, RencanaStrategis, RencanaStrategisDraft, RencanaStrategisView};
pub use register::{build_register, RegisterRow, RegisterSources};
pub use risk::{
    RiskAnalysis, RiskAnalysisDraft, RiskAnalysisView, RiskInput, RiskInputDraft, RiskMonitoring,
    RiskMonitoringDraft, RiskMonitoringView, RiskScore,
};
pub use swot::{
    BobotGroup, StrategicQuadrant, SwotBulkReplace, SwotFactor, SwotFactorDraft, SwotFactorView,
    SwotGroupSummary, BOBOT_TOTAL,
};
pub use tows::{GeneratedStrategy, TowsStrategy, TowsStrategyDraft, TowsTemplate};
pub use types::{
    KriDirection, KriStatus, MonitoringStatus, PlanStatus, RiskLevel, SwotCategory, TowsType,
    UserRole,
};
pub use validate::{from_row, from_rows, to_row, Row, Validate};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with RiskHub records
    pub use crate::{
        from_row, from_rows, to_row, CoreError, RiskLevel, RiskScore, Row, SwotCategory,
        SwotFactor, TowsType, UserRole, Validate, ValidationError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
