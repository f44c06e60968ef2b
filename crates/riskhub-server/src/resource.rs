//! CRUD resources: one table each, plus the checks a write needs
//!
//! The generic handlers in [`crate::crud`] do the routing, scoping and
//! stamping; a [`Resource`] only names its table, its record and draft
//! types, how a record is presented, and what must hold before a write.

use crate::caller::Caller;
use crate::data::decode_rows;
use crate::error::ApiError;
use crate::state::AppState;
use async_trait::async_trait;
use chrono::NaiveDate;
use riskhub_core::swot::check_bobot_capacity;
use riskhub_core::validate::Validator;
use riskhub_core::{
    tables, KeyRiskIndicator, KriDraft, KriView, RencanaStrategis,
    RencanaStrategisDraft, RencanaStrategisView, RiskAnalysis, RiskAnalysisDraft,
    RiskAnalysisView, RiskCategory, RiskCategoryDraft, RiskInput, RiskInputDraft,
    RiskMonitoring, RiskMonitoringDraft, RiskMonitoringView, SwotFactor, SwotFactorDraft,
    SwotFactorView, TowsStrategy, TowsStrategyDraft, Validate, ValidationError, WorkUnit,
    WorkUnitDraft,
};
use riskhub_store::{Filter, Query};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Who may see a table's rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Rows carry `organization_id`; callers see their own organization
    Organization,
    /// Lookup tables shared by everyone
    Global,
}

/// One CRUD resource
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Path segment under `/api`
    const PATH: &'static str;
    const TABLE: &'static str;
    const SCOPE: Scope;
    /// Query parameters accepted as equality filters
    const FILTERS: &'static [&'static str];
    /// Sort column and direction (`true` = ascending)
    const ORDER: (&'static str, bool);

    type Record: DeserializeOwned + Send;
    type Draft: DeserializeOwned + Serialize + Validate + Send + Sync;
    type View: Serialize + Send;

    /// Attach derived values
    fn present(record: Self::Record, today: NaiveDate) -> Self::View;

    /// Checks against stored rows before a write
    ///
    /// `id` is the row being replaced, `None` on create. `org` is the
    /// organization the row belongs to.
    async fn before_write(
        _state: &AppState,
        _caller: &Caller,
        _org: Option<Uuid>,
        _id: Option<Uuid>,
        _draft: &Self::Draft,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

/// The referenced risk exists and is visible to the caller
async fn require_visible_risk(
    state: &AppState,
    caller: &Caller,
    risk_id: Option<Uuid>,
) -> Result<(), ApiError> {
    let Some(risk_id) = risk_id else {
        return Ok(());
    };
    let query = Query::new()
        .columns(&["id"])
        .filters(caller.org_filters()?)
        .eq("id", risk_id.to_string())
        .limit(1);
    if state.store.select(tables::RISK_INPUTS, &query).await?.is_empty() {
        return Err(ValidationError::single("risk_input_id", "does not refer to a known risk").into());
    }
    Ok(())
}

/// Referenced lookup rows exist
async fn require_lookups(
    state: &AppState,
    unit_kerja_id: Option<Uuid>,
    kategori_risiko_id: Option<Uuid>,
) -> Result<(), ApiError> {
    let mut v = Validator::new();
    if let Some(unit) = unit_kerja_id {
        if !state.work_units().await?.iter().any(|u| u.id == unit) {
            v.reject("unit_kerja_id", "does not refer to a known work unit");
        }
    }
    if let Some(kategori) = kategori_risiko_id {
        if !state.risk_categories().await?.iter().any(|c| c.id == kategori) {
            v.reject("kategori_risiko_id", "does not refer to a known category");
        }
    }
    Ok(v.finish()?)
}

pub struct Risks;

#[async_trait]
impl Resource for Risks {
    const PATH: &'static str = "risks";
    const TABLE: &'static str = tables::RISK_INPUTS;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] =
        &["unit_kerja_id", "kategori_risiko_id", "rencana_strategis_id"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = RiskInput;
    type Draft = RiskInputDraft;
    type View = RiskInput;

    fn present(record: RiskInput, _today: NaiveDate) -> RiskInput {
        record
    }

    async fn before_write(
        state: &AppState,
        _caller: &Caller,
        _org: Option<Uuid>,
        _id: Option<Uuid>,
        draft: &RiskInputDraft,
    ) -> Result<(), ApiError> {
        require_lookups(state, draft.unit_kerja_id, draft.kategori_risiko_id).await
    }
}

pub struct RiskInherent;

#[async_trait]
impl Resource for RiskInherent {
    const PATH: &'static str = "risk-inherent";
    const TABLE: &'static str = tables::RISK_INHERENT;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] = &["risk_input_id"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = RiskAnalysis;
    type Draft = RiskAnalysisDraft;
    type View = RiskAnalysisView;

    fn present(record: RiskAnalysis, _today: NaiveDate) -> RiskAnalysisView {
        record.present()
    }

    async fn before_write(
        state: &AppState,
        caller: &Caller,
        _org: Option<Uuid>,
        _id: Option<Uuid>,
        draft: &RiskAnalysisDraft,
    ) -> Result<(), ApiError> {
        require_visible_risk(state, caller, draft.risk_input_id).await
    }
}

pub struct RiskResidual;

#[async_trait]
impl Resource for RiskResidual {
    const PATH: &'static str = "risk-residual";
    const TABLE: &'static str = tables::RISK_RESIDUAL;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] = &["risk_input_id"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = RiskAnalysis;
    type Draft = RiskAnalysisDraft;
    type View = RiskAnalysisView;

    fn present(record: RiskAnalysis, _today: NaiveDate) -> RiskAnalysisView {
        record.present()
    }

    async fn before_write(
        state: &AppState,
        caller: &Caller,
        _org: Option<Uuid>,
        _id: Option<Uuid>,
        draft: &RiskAnalysisDraft,
    ) -> Result<(), ApiError> {
        require_visible_risk(state, caller, draft.risk_input_id).await
    }
}

pub struct Monitoring;

#[async_trait]
impl Resource for Monitoring {
    const PATH: &'static str = "risk-monitoring";
    const TABLE: &'static str = tables::RISK_MONITORING;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] = &["risk_input_id", "status"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = RiskMonitoring;
    type Draft = RiskMonitoringDraft;
    type View = RiskMonitoringView;

    fn present(record: RiskMonitoring, today: NaiveDate) -> RiskMonitoringView {
        record.present(today)
    }

    async fn before_write(
        state: &AppState,
        caller: &Caller,
        _org: Option<Uuid>,
        _id: Option<Uuid>,
        draft: &RiskMonitoringDraft,
    ) -> Result<(), ApiError> {
        require_visible_risk(state, caller, draft.risk_input_id).await
    }
}

pub struct SwotFactors;

#[async_trait]
impl Resource for SwotFactors {
    const PATH: &'static str = "swot-analisis";
    const TABLE: &'static str = tables::SWOT_ANALISIS;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] =
        &["unit_kerja_id", "tahun", "kategori", "rencana_strategis_id"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = SwotFactor;
    type Draft = SwotFactorDraft;
    type View = SwotFactorView;

    fn present(record: SwotFactor, _today: NaiveDate) -> SwotFactorView {
        record.present()
    }

    /// A single write may not push its category past the bobot total
    async fn before_write(
        state: &AppState,
        _caller: &Caller,
        org: Option<Uuid>,
        id: Option<Uuid>,
        draft: &SwotFactorDraft,
    ) -> Result<(), ApiError> {
        let (Some(kategori), Some(unit), Some(tahun), Some(bobot)) =
            (draft.kategori, draft.unit_kerja_id, draft.tahun, draft.bobot)
        else {
            return Ok(());
        };
        let org_filter = match org {
            Some(org) => Filter::eq("organization_id", org.to_string()),
            None => Filter::is_null("organization_id"),
        };
        let query = Query::new()
            .filter(org_filter)
            .eq("unit_kerja_id", unit.to_string())
            .eq("tahun", tahun)
            .eq("kategori", kategori.as_str());
        let existing: Vec<SwotFactor> = decode_rows(
            tables::SWOT_ANALISIS,
            state.store.select(tables::SWOT_ANALISIS, &query).await?,
        );
        let bobot = u32::try_from(bobot).unwrap_or(0);
        check_bobot_capacity(&existing, id, kategori, bobot)?;
        Ok(())
    }
}

pub struct TowsStrategies;

#[async_trait]
impl Resource for TowsStrategies {
    const PATH: &'static str = "swot-tows";
    const TABLE: &'static str = tables::SWOT_TOWS;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] = &["rencana_strategis_id", "tipe_strategi", "tahun"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = TowsStrategy;
    type Draft = TowsStrategyDraft;
    type View = TowsStrategy;

    fn present(record: TowsStrategy, _today: NaiveDate) -> TowsStrategy {
        record
    }
}

pub struct StrategicPlans;

#[async_trait]
impl Resource for StrategicPlans {
    const PATH: &'static str = "rencana-strategis";
    const TABLE: &'static str = tables::RENCANA_STRATEGIS;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] = &["status"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = RencanaStrategis;
    type Draft = RencanaStrategisDraft;
    type View = RencanaStrategisView;

    fn present(record: RencanaStrategis, _today: NaiveDate) -> RencanaStrategisView {
        record.present()
    }
}

pub struct Indicators;

#[async_trait]
impl Resource for Indicators {
    const PATH: &'static str = "kri";
    const TABLE: &'static str = tables::KEY_RISK_INDICATOR;
    const SCOPE: Scope = Scope::Organization;
    const FILTERS: &'static [&'static str] = &["unit_kerja_id", "risk_input_id"];
    const ORDER: (&'static str, bool) = ("created_at", false);

    type Record = KeyRiskIndicator;
    type Draft = KriDraft;
    type View = KriView;

    fn present(record: KeyRiskIndicator, _today: NaiveDate) -> KriView {
        record.present()
    }

    async fn before_write(
        state: &AppState,
        caller: &Caller,
        _org: Option<Uuid>,
        _id: Option<Uuid>,
        draft: &KriDraft,
    ) -> Result<(), ApiError> {
        require_visible_risk(state, caller, draft.risk_input_id).await?;
        require_lookups(state, draft.unit_kerja_id, None).await
    }
}

pub struct WorkUnits;

#[async_trait]
impl Resource for WorkUnits {
    const PATH: &'static str = "work-units";
    const TABLE: &'static str = tables::WORK_UNITS;
    const SCOPE: Scope = Scope::Global;
    const FILTERS: &'static [&'static str] = &["jenis", "kategori"];
    const ORDER: (&'static str, bool) = ("name", true);

    type Record = WorkUnit;
    type Draft = WorkUnitDraft;
    type View = WorkUnit;

    fn present(record: WorkUnit, _today: NaiveDate) -> WorkUnit {
        record
    }
}

pub struct RiskCategories;

#[async_trait]
impl Resource for RiskCategories {
    const PATH: &'static str = "risk-categories";
    const TABLE: &'static str = tables::RISK_CATEGORIES;
    const SCOPE: Scope = Scope::Global;
    const FILTERS: &'static [&'static str] = &[];
    const ORDER: (&'static str, bool) = ("name", true);

    type Record = RiskCategory;
    type Draft = RiskCategoryDraft;
    type View = RiskCategory;

    fn present(record: RiskCategory, _today: NaiveDate) -> RiskCategory {
        record
    }
}
