//! Row store table names

pub const RISK_INPUTS: &str = "risk_inputs";
pub const RISK_INHERENT: &str = "risk_inherent_analysis";
pub const RISK_RESIDUAL: &str = "risk_residual_analysis";
pub const RISK_MONITORING: &str = "risk_monitoring";
pub const SWOT_ANALISIS: &str = "swot_analisis";
pub const SWOT_TOWS: &str = "swot_tows_strategi";
pub const RENCANA_STRATEGIS: &str = "rencana_strategis";
pub const KEY_RISK_INDICATOR: &str = "key_risk_indicator";
pub const WORK_UNITS: &str = "master_work_units";
pub const RISK_CATEGORIES: &str = "master_risk_categories";
pub const USER_PROFILES: &str = "user_profiles";
pub const JOB_RUNS: &str = "maintenance_job_runs";
