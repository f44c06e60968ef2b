//! Testing utilities for RiskHub workspace
//!
//! Shared fixtures and a seeded in-memory backend.

#![allow(missing_docs)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use riskhub_core::tables;
use riskhub_core::{
    KeyRiskIndicator, KriDirection, Kpi, MonitoringStatus, PlanStatus, RencanaStrategis,
    RiskAnalysis, RiskCategory, RiskInput, RiskMonitoring, Row, SwotCategory, SwotFactor,
    UserProfile, UserRole, WorkUnit,
};
use riskhub_store::{AuthUser, MemoryAuth, MemoryStore};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const ORG_A: Uuid = Uuid::from_u128(0xA0);
pub const ORG_B: Uuid = Uuid::from_u128(0xB0);
pub const UNIT_IGD: Uuid = Uuid::from_u128(0x1001);
pub const UNIT_FARMASI: Uuid = Uuid::from_u128(0x1002);
pub const CAT_KLINIS: Uuid = Uuid::from_u128(0x2001);
pub const CAT_KEUANGAN: Uuid = Uuid::from_u128(0x2002);
pub const TAHUN: i32 = 2025;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

pub fn timestamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap()
}

pub fn to_row<T: Serialize>(value: &T) -> Row {
    riskhub_core::to_row(value).unwrap()
}

pub fn create_work_units() -> Vec<WorkUnit> {
    vec![
        WorkUnit {
            id: UNIT_IGD,
            name: "Instalasi Gawat Darurat".into(),
            code: "IGD".into(),
            jenis: Some("Instalasi".into()),
            kategori: Some("Pelayanan".into()),
        },
        WorkUnit {
            id: UNIT_FARMASI,
            name: "Instalasi Farmasi".into(),
            code: "FAR".into(),
            jenis: Some("Instalasi".into()),
            kategori: Some("Penunjang".into()),
        },
    ]
}

pub fn create_risk_categories() -> Vec<RiskCategory> {
    vec![
        RiskCategory {
            id: CAT_KLINIS,
            name: "Klinis".into(),
            description: Some("Keselamatan pasien".into()),
        },
        RiskCategory {
            id: CAT_KEUANGAN,
            name: "Keuangan".into(),
            description: None,
        },
    ]
}

pub fn create_risk(org: Uuid, unit: Uuid, kode: Option<&str>, sasaran: &str) -> RiskInput {
    RiskInput {
        id: Uuid::new_v4(),
        kode_risiko: kode.map(str::to_string),
        sasaran: sasaran.into(),
        pemilik_risiko: Some("Kepala Instalasi".into()),
        kategori_risiko_id: Some(CAT_KLINIS),
        unit_kerja_id: Some(unit),
        rencana_strategis_id: None,
        penyebab_risiko: None,
        dampak_risiko: None,
        organization_id: Some(org),
        created_at: Some(timestamp(1)),
    }
}

pub fn create_analysis(risk_id: Uuid, org: Uuid, probability: u8, impact: u8) -> RiskAnalysis {
    RiskAnalysis {
        id: Uuid::new_v4(),
        risk_input_id: risk_id,
        probability,
        impact,
        keterangan: None,
        organization_id: Some(org),
        created_at: Some(timestamp(2)),
    }
}

pub fn create_monitoring(
    risk_id: Uuid,
    org: Uuid,
    status: MonitoringStatus,
    next_review: Option<NaiveDate>,
) -> RiskMonitoring {
    RiskMonitoring {
        id: Uuid::new_v4(),
        risk_input_id: risk_id,
        pemilik: Some("Komite Mutu".into()),
        rencana_mitigasi: "Pelatihan ulang petugas".into(),
        tanggal_review: NaiveDate::from_ymd_opt(2025, 1, 15),
        tanggal_review_berikutnya: next_review,
        status,
        organization_id: Some(org),
        created_at: Some(timestamp(3)),
    }
}

pub fn create_swot_factor(
    org: Uuid,
    unit: Uuid,
    kategori: SwotCategory,
    text: &str,
    bobot: u32,
    rank: u32,
) -> SwotFactor {
    SwotFactor {
        id: Uuid::new_v4(),
        kategori,
        objek_analisis: text.into(),
        bobot,
        rank,
        unit_kerja_id: Some(unit),
        tahun: TAHUN,
        rencana_strategis_id: None,
        organization_id: Some(org),
        created_at: Some(timestamp(4)),
    }
}

/// A complete SWOT set for one unit: every category totals 100
pub fn create_swot_set(org: Uuid, unit: Uuid) -> Vec<SwotFactor> {
    use SwotCategory::*;
    vec![
        create_swot_factor(org, unit, Strength, "SDM tersertifikasi", 60, 4),
        create_swot_factor(org, unit, Strength, "Peralatan modern", 40, 3),
        create_swot_factor(org, unit, Weakness, "Sistem informasi terfragmentasi", 100, 2),
        create_swot_factor(org, unit, Opportunity, "Kerja sama BPJS", 70, 4),
        create_swot_factor(org, unit, Opportunity, "Wisata medis", 30, 2),
        create_swot_factor(org, unit, Threat, "Rumah sakit pesaing baru", 100, 3),
    ]
}

pub fn create_kri(org: Uuid, kode: &str, nilai_aktual: Option<f64>) -> KeyRiskIndicator {
    KeyRiskIndicator {
        id: Uuid::new_v4(),
        kode: kode.into(),
        nama_indikator: "Angka infeksi daerah operasi".into(),
        risk_input_id: None,
        unit_kerja_id: Some(UNIT_IGD),
        satuan: Some("%".into()),
        arah: KriDirection::HigherIsWorse,
        batas_aman: 1.0,
        batas_hati_hati: 2.0,
        nilai_aktual,
        organization_id: Some(org),
        created_at: Some(timestamp(5)),
    }
}

pub fn create_plan(org: Uuid) -> RencanaStrategis {
    RencanaStrategis {
        id: Uuid::new_v4(),
        kode: "RENSTRA-2025".into(),
        nama: "Rencana Strategis 2025-2029".into(),
        target: Some("Akreditasi paripurna".into()),
        periode_mulai: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        periode_selesai: NaiveDate::from_ymd_opt(2029, 12, 31).unwrap(),
        sasaran_strategis: vec!["Peningkatan mutu layanan".into()],
        indikator_kinerja_utama: vec![Kpi {
            nama: "Indeks kepuasan pasien".into(),
            target: 80.0,
            realisasi: Some(72.0),
            satuan: Some("%".into()),
        }],
        status: PlanStatus::Aktif,
        organization_id: Some(org),
        created_at: Some(timestamp(6)),
    }
}

/// Ids of rows seeded by [`TestBackend::seed_organization`]
#[derive(Debug, Clone)]
pub struct SeededOrg {
    pub risks: Vec<RiskInput>,
    pub swot: Vec<SwotFactor>,
    pub kri: Vec<KeyRiskIndicator>,
    pub plan: RencanaStrategis,
}

/// In-memory store and auth sharing one fixture world
#[derive(Debug, Clone)]
pub struct TestBackend {
    pub store: Arc<MemoryStore>,
    pub auth: Arc<MemoryAuth>,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Backend with master data seeded
    pub fn new() -> Self {
        let backend = Self::empty();
        backend.seed(tables::WORK_UNITS, &create_work_units());
        backend.seed(tables::RISK_CATEGORIES, &create_risk_categories());
        backend
    }

    /// Backend with no rows at all
    pub fn empty() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            auth: Arc::new(MemoryAuth::new()),
        }
    }

    pub fn seed<T: Serialize>(&self, table: &str, rows: &[T]) {
        self.store.seed(table, rows.iter().map(to_row));
    }

    /// Account with a profile row; returns the auth user
    pub fn add_account(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
        org: Option<Uuid>,
    ) -> AuthUser {
        let user = self.auth.add_user(email, password);
        let profile = UserProfile {
            id: user.id,
            email: email.into(),
            full_name: Some(format!("Pengguna {role:?}")),
            role,
            organization_id: org,
        };
        self.seed(tables::USER_PROFILES, &[profile]);
        user
    }

    /// Fresh account of the given role; returns a live access token
    pub fn login_as(&self, role: UserRole, org: Option<Uuid>) -> String {
        let email = format!("{}@rs.test", Uuid::new_v4().simple());
        let user = self.add_account(&email, "rahasia", role, org);
        self.auth.issue_token(&user)
    }

    /// Risks, analyses, monitoring, SWOT, KRI and a plan for one organization
    pub fn seed_organization(&self, org: Uuid) -> SeededOrg {
        let risks = vec![
            create_risk(org, UNIT_IGD, Some("R-IGD-001"), "Pasien jatuh di ruang observasi"),
            create_risk(org, UNIT_FARMASI, Some("R-FAR-001"), "Kesalahan dispensing obat"),
        ];
        self.seed(tables::RISK_INPUTS, &risks);
        self.seed(
            tables::RISK_INHERENT,
            &[
                create_analysis(risks[0].id, org, 4, 5),
                create_analysis(risks[1].id, org, 3, 3),
            ],
        );
        self.seed(tables::RISK_RESIDUAL, &[create_analysis(risks[0].id, org, 2, 3)]);
        self.seed(
            tables::RISK_MONITORING,
            &[create_monitoring(
                risks[0].id,
                org,
                MonitoringStatus::InProgress,
                NaiveDate::from_ymd_opt(2025, 3, 1),
            )],
        );
        let swot = create_swot_set(org, UNIT_IGD);
        self.seed(tables::SWOT_ANALISIS, &swot);
        let kri = vec![
            create_kri(org, "KRI-01", Some(0.5)),
            create_kri(org, "KRI-02", Some(3.2)),
        ];
        self.seed(tables::KEY_RISK_INDICATOR, &kri);
        let plan = create_plan(org);
        self.seed(tables::RENCANA_STRATEGIS, &[plan.clone()]);
        SeededOrg {
            risks,
            swot,
            kri,
            plan,
        }
    }
}
