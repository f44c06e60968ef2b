//! Maintenance jobs against the in-memory store

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use riskhub_core::{tables, Row, SwotCategory};
use riskhub_maintenance::{Change, JobError, Ledger, RunOptions, Runner};
use riskhub_store::{MemoryStore, RowStore};
use riskhub_test_utils::{
    create_risk, create_swot_factor, TestBackend, ORG_A, ORG_B, UNIT_FARMASI, UNIT_IGD,
};
use serde_json::Value;
use std::sync::Arc;

const RUN: RunOptions = RunOptions {
    dry_run: false,
    force: false,
};
const DRY_RUN: RunOptions = RunOptions {
    dry_run: true,
    force: false,
};

fn runner(backend: &TestBackend) -> Runner {
    let store: Arc<dyn RowStore> = backend.store.clone();
    Runner::new(store)
}

fn bobot_by_text(store: &MemoryStore) -> Vec<(String, u64)> {
    let mut out: Vec<(String, u64)> = store
        .dump(tables::SWOT_ANALISIS)
        .iter()
        .map(|r| {
            (
                r["objek_analisis"].as_str().unwrap_or_default().to_string(),
                r["bobot"].as_u64().unwrap_or(0),
            )
        })
        .collect();
    out.sort();
    out
}

fn seed_overweight_strengths(backend: &TestBackend) {
    let factors: Vec<_> = [("S1", 40), ("S2", 30), ("S3", 25), ("S4", 24), ("S5", 1)]
        .into_iter()
        .map(|(text, bobot)| {
            create_swot_factor(ORG_A, UNIT_IGD, SwotCategory::Strength, text, bobot, 3)
        })
        .collect();
    backend.seed(tables::SWOT_ANALISIS, &factors);
}

#[tokio::test]
async fn normalize_rescales_overweight_category_to_100() {
    let backend = TestBackend::new();
    seed_overweight_strengths(&backend);

    let report = runner(&backend)
        .run("normalize-swot-bobot", RUN)
        .await
        .unwrap();
    assert!(!report.dry_run);
    assert_eq!(report.written, report.changes.len());

    let bobot = bobot_by_text(&backend.store);
    assert_eq!(bobot.iter().map(|(_, b)| b).sum::<u64>(), 100);
    assert!(bobot.iter().all(|(_, b)| *b >= 5), "{bobot:?}");
    let s1 = bobot.iter().find(|(t, _)| t == "S1").map(|(_, b)| *b);
    let s5 = bobot.iter().find(|(t, _)| t == "S5").map(|(_, b)| *b);
    assert!(s1 > s5);
}

#[tokio::test]
async fn normalize_leaves_complete_sets_alone() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);

    let report = runner(&backend)
        .run("normalize-swot-bobot", DRY_RUN)
        .await
        .unwrap();
    assert!(report.changes.is_empty());
}

#[tokio::test]
async fn normalize_keeps_organizations_apart() {
    let backend = TestBackend::new();
    backend.seed(
        tables::SWOT_ANALISIS,
        &[
            create_swot_factor(ORG_A, UNIT_IGD, SwotCategory::Threat, "A", 60, 3),
            create_swot_factor(ORG_B, UNIT_IGD, SwotCategory::Threat, "B", 40, 3),
        ],
    );

    runner(&backend)
        .run("normalize-swot-bobot", RUN)
        .await
        .unwrap();

    assert_eq!(
        bobot_by_text(&backend.store),
        vec![("A".to_string(), 100), ("B".to_string(), 100)]
    );
}

fn legacy_row(text: &str, bobot: Value) -> Row {
    let factor = create_swot_factor(ORG_A, UNIT_IGD, SwotCategory::Strength, text, 0, 3);
    let mut row = riskhub_test_utils::to_row(&factor);
    row.insert("bobot".into(), bobot);
    row
}

fn stored_total(store: &MemoryStore) -> f64 {
    store
        .dump(tables::SWOT_ANALISIS)
        .iter()
        .map(|r| match &r["bobot"] {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.parse().unwrap_or(0.0),
            _ => 0.0,
        })
        .sum()
}

#[tokio::test]
async fn normalize_reads_numbers_stored_as_text() {
    let backend = TestBackend::new();
    let mut rows = vec![
        legacy_row("S1", Value::from(40)),
        legacy_row("S2", Value::from("30")),
        legacy_row("S3", Value::from(25)),
        legacy_row("S4", Value::from(15)),
        legacy_row("S5", Value::from(10)),
    ];
    rows[4].insert("tahun".into(), Value::from("2025"));
    backend.store.seed(tables::SWOT_ANALISIS, rows);

    let runner = runner(&backend);
    let first = runner
        .run("normalize-swot-bobot", RunOptions { dry_run: false, force: true })
        .await
        .unwrap();
    assert_eq!(first.written, first.changes.len());
    assert!(first.written > 0);
    assert_eq!(stored_total(&backend.store), 100.0);

    let again = runner
        .run("normalize-swot-bobot", RunOptions { dry_run: true, force: true })
        .await
        .unwrap();
    assert!(again.changes.is_empty());
}

#[tokio::test]
async fn normalize_rewrites_fractional_bobot() {
    let backend = TestBackend::new();
    backend.store.seed(
        tables::SWOT_ANALISIS,
        [
            legacy_row("S1", Value::from(33.4)),
            legacy_row("S2", Value::from(33.3)),
            legacy_row("S3", Value::from(33.3)),
        ],
    );

    runner(&backend)
        .run("normalize-swot-bobot", RUN)
        .await
        .unwrap();

    let bobot = bobot_by_text(&backend.store);
    assert_eq!(bobot.iter().map(|(_, b)| b).sum::<u64>(), 100);
    assert!(backend
        .store
        .dump(tables::SWOT_ANALISIS)
        .iter()
        .all(|r| r["bobot"].is_u64()));
}

#[tokio::test]
async fn normalize_refuses_unreadable_rows() {
    let backend = TestBackend::new();
    backend.store.seed(
        tables::SWOT_ANALISIS,
        [
            legacy_row("S1", Value::from(80)),
            legacy_row("S2", Value::from("banyak")),
        ],
    );

    let err = runner(&backend)
        .run("normalize-swot-bobot", RUN)
        .await
        .unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(backend.store.count(tables::JOB_RUNS), 0);
    assert_eq!(bobot_by_text(&backend.store)[0], ("S1".to_string(), 80));
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let backend = TestBackend::new();
    seed_overweight_strengths(&backend);
    let before = bobot_by_text(&backend.store);

    let report = runner(&backend)
        .run("normalize-swot-bobot", DRY_RUN)
        .await
        .unwrap();

    assert!(report.dry_run);
    assert!(!report.changes.is_empty());
    assert_eq!(report.written, 0);
    assert_eq!(bobot_by_text(&backend.store), before);
    assert_eq!(backend.store.count(tables::JOB_RUNS), 0);
}

#[tokio::test]
async fn every_job_plans_nothing_on_second_run() {
    let backend = TestBackend::new();
    seed_overweight_strengths(&backend);
    backend.seed(
        tables::RISK_INPUTS,
        &[create_risk(ORG_A, UNIT_IGD, None, "Keterlambatan triase")],
    );
    let scored = create_swot_factor(
        ORG_A,
        UNIT_FARMASI,
        SwotCategory::Weakness,
        "Stok obat kosong",
        100,
        2,
    );
    let mut row = riskhub_test_utils::to_row(&scored);
    row.insert("score".into(), Value::from(200));
    backend.store.seed(tables::SWOT_ANALISIS, [row]);

    let runner = runner(&backend);
    let ids: Vec<&str> = runner.jobs().map(|j| j.id()).collect();
    for id in &ids {
        runner
            .run(id, RunOptions { dry_run: false, force: true })
            .await
            .unwrap();
    }
    for id in &ids {
        let again = runner
            .run(id, RunOptions { dry_run: true, force: true })
            .await
            .unwrap();
        assert!(again.changes.is_empty(), "{id} planned {:?}", again.changes);
    }
}

#[tokio::test]
async fn ledger_records_runs_and_run_pending_skips_them() {
    let backend = TestBackend::new();
    let runner = runner(&backend);

    let first = runner.run("clear-stored-swot-score", RUN).await.unwrap();
    assert!(!first.skipped);

    let runs = Ledger::new(backend.store.as_ref()).runs().await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].job_id, "clear-stored-swot-score");
    assert_eq!(runs[0].version, 1);

    let again = runner.run("clear-stored-swot-score", RUN).await.unwrap();
    assert!(again.skipped);

    let pending = runner.run_pending(RUN).await.unwrap();
    let ran: Vec<&str> = pending.iter().map(|r| r.job_id).collect();
    assert_eq!(
        ran,
        vec!["seed-master-data", "normalize-swot-bobot", "backfill-risk-codes"]
    );
    assert!(runner.run_pending(RUN).await.unwrap().is_empty());

    let status = runner.status().await.unwrap();
    assert!(status.iter().all(|s| !s.is_pending()));
}

#[tokio::test]
async fn clear_score_nulls_stored_scores() {
    let backend = TestBackend::new();
    let factor = create_swot_factor(ORG_A, UNIT_IGD, SwotCategory::Strength, "S", 100, 4);
    let mut row: Row = riskhub_test_utils::to_row(&factor);
    row.insert("score".into(), Value::from(400));
    backend.store.seed(tables::SWOT_ANALISIS, [row]);

    let report = runner(&backend)
        .run("clear-stored-swot-score", RUN)
        .await
        .unwrap();

    assert_eq!(report.written, 1);
    assert!(backend.store.dump(tables::SWOT_ANALISIS)[0]["score"].is_null());
}

#[tokio::test]
async fn backfill_continues_numbering_per_unit() {
    let backend = TestBackend::new();
    let mut general = create_risk(ORG_A, UNIT_IGD, None, "Gangguan listrik");
    general.unit_kerja_id = None;
    backend.seed(
        tables::RISK_INPUTS,
        &[
            create_risk(ORG_A, UNIT_IGD, Some("R-IGD-001"), "Pasien jatuh"),
            create_risk(ORG_A, UNIT_IGD, None, "Keterlambatan triase"),
            create_risk(ORG_B, UNIT_IGD, None, "Salah identifikasi pasien"),
            create_risk(ORG_A, UNIT_FARMASI, Some(""), "Obat kedaluwarsa"),
            general,
        ],
    );

    runner(&backend)
        .run("backfill-risk-codes", RUN)
        .await
        .unwrap();

    let mut codes: Vec<(String, String)> = backend
        .store
        .dump(tables::RISK_INPUTS)
        .iter()
        .map(|r| {
            (
                r["sasaran"].as_str().unwrap_or_default().to_string(),
                r["kode_risiko"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    codes.sort();
    assert_eq!(
        codes,
        vec![
            ("Gangguan listrik".to_string(), "R-UMUM-001".to_string()),
            ("Keterlambatan triase".to_string(), "R-IGD-002".to_string()),
            ("Obat kedaluwarsa".to_string(), "R-FAR-001".to_string()),
            ("Pasien jatuh".to_string(), "R-IGD-001".to_string()),
            ("Salah identifikasi pasien".to_string(), "R-IGD-001".to_string()),
        ]
    );
}

#[tokio::test]
async fn backfill_needs_work_units() {
    let backend = TestBackend::empty();
    let err = runner(&backend)
        .run("backfill-risk-codes", RUN)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(backend.store.count(tables::JOB_RUNS), 0);
}

#[tokio::test]
async fn seed_inserts_only_missing_master_data() {
    let backend = TestBackend::new();
    let report = runner(&backend).run("seed-master-data", RUN).await.unwrap();

    let inserted_units = report
        .changes
        .iter()
        .filter(|c| c.table() == tables::WORK_UNITS)
        .count();
    assert_eq!(inserted_units, 9);
    assert_eq!(report.changes.len() - inserted_units, 4);
    assert!(report.changes.iter().all(|c| matches!(c, Change::Insert { .. })));
    assert_eq!(backend.store.count(tables::WORK_UNITS), 11);
    assert_eq!(backend.store.count(tables::RISK_CATEGORIES), 6);
}

#[tokio::test]
async fn unknown_job_is_rejected() {
    let backend = TestBackend::new();
    let err = runner(&backend).run("drop-everything", RUN).await.unwrap_err();
    assert!(matches!(err, JobError::UnknownJob(ref id) if id == "drop-everything"));
}

proptest! {
    #[test]
    fn normalized_categories_total_100(weights in prop::collection::vec(0u32..200, 1..12)) {
        let backend = TestBackend::new();
        let factors: Vec<_> = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                create_swot_factor(ORG_A, UNIT_IGD, SwotCategory::Opportunity, &format!("O{i}"), w, 1)
            })
            .collect();
        backend.seed(tables::SWOT_ANALISIS, &factors);

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(runner(&backend).run("normalize-swot-bobot", RUN)).unwrap();

        let bobot = bobot_by_text(&backend.store);
        prop_assert_eq!(bobot.iter().map(|(_, b)| b).sum::<u64>(), 100);
        if weights.iter().sum::<u32>() != 100 {
            let floor = (100 / weights.len() as u64).min(5);
            prop_assert!(bobot.iter().all(|(_, b)| *b >= floor));
        }
    }
}
