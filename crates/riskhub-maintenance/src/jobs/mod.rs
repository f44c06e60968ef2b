//! Built-in jobs

mod backfill_risk_codes;
mod clear_swot_score;
mod normalize_swot_bobot;
mod seed_master_data;

pub use backfill_risk_codes::{BackfillRiskCodes, GENERAL_UNIT};
pub use clear_swot_score::ClearStoredSwotScore;
pub use normalize_swot_bobot::NormalizeSwotBobot;
pub use seed_master_data::{SeedMasterData, DEFAULT_RISK_CATEGORIES, DEFAULT_WORK_UNITS};

use crate::job::MaintenanceJob;

/// Every built-in job, in the order `run-pending` applies them
#[must_use]
pub fn all() -> Vec<Box<dyn MaintenanceJob>> {
    vec![
        Box::new(SeedMasterData),
        Box::new(ClearStoredSwotScore),
        Box::new(NormalizeSwotBobot),
        Box::new(BackfillRiskCodes),
    ]
}
