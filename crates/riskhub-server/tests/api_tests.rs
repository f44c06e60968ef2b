//! JSON API against the in-memory backend

use async_trait::async_trait;
use mockall::mock;
use pretty_assertions::assert_eq;
use riskhub_core::{tables, Row, UserRole};
use riskhub_server::routes::routes;
use riskhub_server::{AppState, ServerConfig};
use riskhub_store::{Filter, Query, RowStore, StoreError};
use riskhub_test_utils::{
    today, TestBackend, CAT_KLINIS, ORG_A, ORG_B, TAHUN, UNIT_FARMASI, UNIT_IGD,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;

fn state(backend: &TestBackend) -> AppState {
    AppState::new(
        backend.store.clone(),
        backend.auth.clone(),
        ServerConfig::memory(),
    )
    .with_today(today())
}

fn body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn risk_body(unit: Uuid) -> Value {
    json!({
        "sasaran": "Keterlambatan triase",
        "pemilik_risiko": "Kepala IGD",
        "kategori_risiko_id": CAT_KLINIS,
        "unit_kerja_id": unit,
    })
}

#[tokio::test]
async fn health_is_public() {
    let backend = TestBackend::new();
    let api = routes(state(&backend));

    let res = warp::test::request().path("/api/health").reply(&api).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res)["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let backend = TestBackend::new();
    let api = routes(state(&backend));

    let res = warp::test::request().path("/api/risks").reply(&api).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "unauthorized");

    let res = warp::test::request()
        .path("/api/risks")
        .header("authorization", "Bearer not-a-session")
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_session_usable_as_bearer() {
    let backend = TestBackend::new();
    backend.add_account("admin@rs.id", "rahasia", UserRole::Admin, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/auth/login")
        .json(&json!({"email": "admin@rs.id", "password": "salah"}))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = warp::test::request()
        .method("POST")
        .path("/api/auth/login")
        .json(&json!({"email": "admin@rs.id", "password": "rahasia"}))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let token = body(&res)["access_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let res = warp::test::request()
        .path("/api/auth/me")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let me = body(&res);
    assert_eq!(me["role"], "admin");
    assert_eq!(me["organization_id"], ORG_A.to_string());

    let res = warp::test::request()
        .method("POST")
        .path("/api/auth/logout")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = warp::test::request()
        .path("/api/auth/me")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_without_profile_is_forbidden() {
    let backend = TestBackend::new();
    let user = backend.auth.add_user("orphan@rs.id", "rahasia");
    let token = backend.auth.issue_token(&user);
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn organizations_do_not_see_each_other() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let other = backend.seed_organization(ORG_B);
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let risks = body(&res);
    let risks = risks.as_array().unwrap();
    assert_eq!(risks.len(), 2);
    assert!(risks
        .iter()
        .all(|r| r["organization_id"] == ORG_A.to_string()));

    let res = warp::test::request()
        .path(&format!("/api/risks/{}", other.risks[0].id))
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let admin = backend.login_as(UserRole::Superadmin, None);
    let res = warp::test::request()
        .path("/api/risks")
        .header("authorization", bearer(&admin))
        .reply(&api)
        .await;
    assert_eq!(body(&res).as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn list_filters_by_query_parameters() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path(&format!("/api/risks?unit_kerja_id={UNIT_FARMASI}"))
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    let risks = body(&res);
    let risks = risks.as_array().unwrap();
    assert_eq!(risks.len(), 1);
    assert_eq!(risks[0]["kode_risiko"], "R-FAR-001");
}

#[tokio::test]
async fn viewer_cannot_write() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .json(&risk_body(UNIT_IGD))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(&res)["error"]["code"], "forbidden");
    assert_eq!(backend.store.count(tables::RISK_INPUTS), 0);
}

#[tokio::test]
async fn create_reports_every_missing_field() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .json(&json!({"pemilik_risiko": "Kepala IGD"}))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err = body(&res);
    assert_eq!(err["error"]["code"], "validation_failed");
    let fields: Vec<&str> = err["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["sasaran", "kategori_risiko_id", "unit_kerja_id"]);
}

#[tokio::test]
async fn unknown_work_unit_is_rejected() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .json(&risk_body(Uuid::new_v4()))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&res)["error"]["details"][0]["field"], "unit_kerja_id");
}

#[tokio::test]
async fn create_stamps_the_callers_organization() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let mut payload = risk_body(UNIT_IGD);
    payload["organization_id"] = json!(ORG_B);
    let res = warp::test::request()
        .method("POST")
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .json(&payload)
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body(&res);
    assert_eq!(created["organization_id"], ORG_A.to_string());
    assert!(created["id"].is_string());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/risks")
        .header("authorization", bearer(&token))
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analysis_view_carries_value_and_level() {
    let backend = TestBackend::new();
    let seeded = backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/risk-residual")
        .header("authorization", bearer(&token))
        .json(&json!({"risk_input_id": seeded.risks[1].id, "probability": 2, "impact": 2}))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body(&res);
    assert_eq!(created["risk_value"], 4);
    assert_eq!(created["risk_level"], "low");

    let res = warp::test::request()
        .method("POST")
        .path("/api/risk-residual")
        .header("authorization", bearer(&token))
        .json(&json!({"risk_input_id": seeded.risks[1].id, "probability": 6, "impact": 2}))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn swot_score_is_always_derived() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/swot-analisis")
        .header("authorization", bearer(&token))
        .json(&json!({
            "kategori": "Strength",
            "objek_analisis": "Apoteker berpengalaman",
            "bobot": 30,
            "rank": 4,
            "score": 999,
            "unit_kerja_id": UNIT_FARMASI,
            "tahun": TAHUN,
        }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body(&res)["score"], 120);
    let stored = backend.store.dump(tables::SWOT_ANALISIS);
    assert!(stored[0].get("score").is_none());
}

#[tokio::test]
async fn single_write_may_not_exceed_bobot_total() {
    let backend = TestBackend::new();
    let seeded = backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/swot-analisis")
        .header("authorization", bearer(&token))
        .json(&json!({
            "kategori": "Strength",
            "objek_analisis": "Lokasi strategis",
            "bobot": 10,
            "rank": 3,
            "unit_kerja_id": UNIT_IGD,
            "tahun": TAHUN,
        }))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body(&res)["error"]["code"], "invariant_violated");

    // updating the 60 to 50 keeps the category at 90
    let strength = &seeded.swot[0];
    let res = warp::test::request()
        .method("PUT")
        .path(&format!("/api/swot-analisis/{}", strength.id))
        .header("authorization", bearer(&token))
        .json(&json!({
            "kategori": "Strength",
            "objek_analisis": strength.objek_analisis,
            "bobot": 50,
            "rank": 5,
            "unit_kerja_id": UNIT_IGD,
            "tahun": TAHUN,
        }))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res)["score"], 250);
}

#[tokio::test]
async fn bulk_replace_requires_exact_total() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let replace = |weights: [i64; 2]| {
        json!({
            "unit_kerja_id": UNIT_IGD,
            "tahun": TAHUN,
            "kategori": "Strength",
            "factors": [
                {"objek_analisis": "SDM tersertifikasi", "bobot": weights[0], "rank": 4},
                {"objek_analisis": "Akreditasi paripurna", "bobot": weights[1], "rank": 5},
            ],
        })
    };

    let res = warp::test::request()
        .method("POST")
        .path("/api/swot-analisis/bulk")
        .header("authorization", bearer(&token))
        .json(&replace([50, 40]))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(backend.store.count(tables::SWOT_ANALISIS), 6);

    let res = warp::test::request()
        .method("POST")
        .path("/api/swot-analisis/bulk")
        .header("authorization", bearer(&token))
        .json(&replace([55, 45]))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let replaced = body(&res);
    assert_eq!(replaced["removed"], 2);
    let scores: Vec<i64> = replaced["factors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["score"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![220, 225]);
    assert_eq!(backend.store.count(tables::SWOT_ANALISIS), 6);
}

#[tokio::test]
async fn swot_summary_places_the_unit_in_a_quadrant() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path(&format!("/api/swot-analisis/summary?tahun={TAHUN}"))
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let groups = body(&res);
    let group = &groups[0];
    // S 360 - W 200, O 340 - T 300
    assert_eq!(group["sumbu_x"], 160);
    assert_eq!(group["sumbu_y"], 40);
    assert_eq!(group["kuadran"]["strategi"], "SO");

    let res = warp::test::request()
        .path("/api/swot-analisis/summary?unit_kerja_id=igd")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn swot_summary_keeps_organizations_apart_for_superadmin() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    backend.seed_organization(ORG_B);
    let token = backend.login_as(UserRole::Superadmin, None);
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path(&format!("/api/swot-analisis/summary?tahun={TAHUN}&unit_kerja_id={UNIT_IGD}"))
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let groups = body(&res);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    let orgs: Vec<&Value> = groups.iter().map(|g| &g["organization_id"]).collect();
    assert!(orgs.contains(&&json!(ORG_A)));
    assert!(orgs.contains(&&json!(ORG_B)));
    for group in groups {
        for category in group["categories"].as_array().unwrap() {
            assert_eq!(category["total_bobot"], 100);
            assert_eq!(category["bobot_complete"], true);
        }
        assert_eq!(group["sumbu_x"], 160);
    }
}

#[tokio::test]
async fn unreadable_master_row_does_not_break_summaries() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let mut legacy = Row::new();
    legacy.insert("id".into(), json!(Uuid::new_v4()));
    legacy.insert("name".into(), json!("Unit lama tanpa kode"));
    backend.store.seed(tables::WORK_UNITS, [legacy]);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    for path in ["/api/dashboard", "/api/risk-register", "/api/reports/swot/excel"] {
        let res = warp::test::request()
            .path(path)
            .header("authorization", bearer(&token))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }

    let res = warp::test::request()
        .path("/api/risk-register")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    let rows = body(&res);
    let igd = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["kode_risiko"] == "R-IGD-001")
        .unwrap();
    assert_eq!(igd["unit_kerja"], "Instalasi Gawat Darurat");

    let res = warp::test::request()
        .method("POST")
        .path("/api/risks")
        .header("authorization", bearer(&backend.login_as(UserRole::User, Some(ORG_A))))
        .json(&risk_body(UNIT_IGD))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn dashboard_counts_latest_state() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    backend.seed_organization(ORG_B);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path("/api/dashboard")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let summary = body(&res);
    assert_eq!(summary["total_risiko"], 2);
    assert_eq!(summary["inherent"]["extreme"], 1);
    assert_eq!(summary["inherent"]["medium"], 1);
    assert_eq!(summary["monitoring"]["overdue"], 1);
    assert_eq!(summary["kri"]["aman"], 1);
    assert_eq!(summary["kri"]["kritis"], 1);
    assert_eq!(summary["total_faktor_swot"], 6);
}

#[tokio::test]
async fn register_joins_analyses_and_monitoring() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path("/api/risk-register")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    let rows = body(&res);
    let igd = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["kode_risiko"] == "R-IGD-001")
        .unwrap();
    assert_eq!(igd["inherent_value"], 20);
    assert_eq!(igd["residual_value"], 6);
    assert_eq!(igd["unit_kerja"], "Instalasi Gawat Darurat");
    assert_eq!(igd["overdue"], true);
}

#[tokio::test]
async fn generated_strategies_can_be_persisted() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/api/swot-tows/generate")
        .header("authorization", bearer(&token))
        .json(&json!({"unit_kerja_id": UNIT_IGD, "tahun": TAHUN, "persist": true}))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let generated = body(&res);
    assert_eq!(generated["strategies"].as_array().unwrap().len(), 4);
    assert_eq!(generated["persisted"], 4);

    let res = warp::test::request()
        .path("/api/swot-tows")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(body(&res).as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn viewer_may_preview_but_not_persist_strategies() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let request = |persist: bool| {
        warp::test::request()
            .method("POST")
            .path("/api/swot-tows/generate")
            .header("authorization", bearer(&token))
            .json(&json!({"unit_kerja_id": UNIT_IGD, "tahun": TAHUN, "persist": persist}))
    };

    assert_eq!(request(false).reply(&api).await.status(), StatusCode::OK);
    assert_eq!(request(true).reply(&api).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.store.count(tables::SWOT_TOWS), 0);
}

#[tokio::test]
async fn reports_download_as_attachments() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let api = routes(state(&backend));

    let res = warp::test::request()
        .path("/api/reports/risk-register/excel")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        res.headers()["content-disposition"],
        "attachment; filename=\"risk-register-2025-06-30.xlsx\""
    );
    assert!(res.body().starts_with(b"PK\x03\x04"));

    let res = warp::test::request()
        .path("/api/reports/swot/pdf")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/pdf");
    assert!(res.body().starts_with(b"%PDF-"));

    for query in ["unit_kerja_id=igd", "tahun=dua-ribu"] {
        let res = warp::test::request()
            .path(&format!("/api/reports/swot/excel?{query}"))
            .header("authorization", bearer(&token))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{query}");
    }

    let res = warp::test::request()
        .path("/api/reports/anggaran/pdf")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_needs_manager() {
    let backend = TestBackend::new();
    let seeded = backend.seed_organization(ORG_A);
    let user = backend.login_as(UserRole::User, Some(ORG_A));
    let manager = backend.login_as(UserRole::Manager, Some(ORG_A));
    let api = routes(state(&backend));
    let path = format!("/api/kri/{}", seeded.kri[0].id);

    let res = warp::test::request()
        .method("DELETE")
        .path(&path)
        .header("authorization", bearer(&user))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = warp::test::request()
        .method("DELETE")
        .path(&path)
        .header("authorization", bearer(&manager))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = warp::test::request()
        .path(&path)
        .header("authorization", bearer(&manager))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn master_data_is_admin_only_and_refreshes() {
    let backend = TestBackend::new();
    let user = backend.login_as(UserRole::User, Some(ORG_A));
    let admin = backend.login_as(UserRole::Admin, Some(ORG_A));
    let api = routes(state(&backend));
    let unit = json!({"name": "Instalasi Rawat Inap", "code": "RI", "jenis": "instalasi"});

    let list = |token: &str| {
        warp::test::request()
            .path("/api/work-units")
            .header("authorization", bearer(token))
    };
    assert_eq!(body(&list(&user).reply(&api).await).as_array().unwrap().len(), 2);

    let res = warp::test::request()
        .method("POST")
        .path("/api/work-units")
        .header("authorization", bearer(&user))
        .json(&unit)
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = warp::test::request()
        .method("POST")
        .path("/api/work-units")
        .header("authorization", bearer(&admin))
        .json(&unit)
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let units = body(&list(&user).reply(&api).await);
    let names: Vec<&str> = units
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Instalasi Farmasi", "Instalasi Gawat Darurat", "Instalasi Rawat Inap"]
    );
}

mock! {
    pub Store {}

    #[async_trait]
    impl RowStore for Store {
        async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError>;
        async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;
        async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, StoreError>;
        async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError>;
    }
}

#[tokio::test]
async fn store_failure_is_a_bad_gateway() {
    let backend = TestBackend::empty();
    let user = backend.auth.add_user("a@rs.id", "rahasia");
    let token = backend.auth.issue_token(&user);

    let mut store = MockStore::new();
    store
        .expect_select()
        .returning(|_, _| Err(StoreError::Transport("connection refused".into())));
    let state = AppState::new(Arc::new(store), backend.auth.clone(), ServerConfig::memory());
    let api = routes(state);

    let res = warp::test::request()
        .path("/api/dashboard")
        .header("authorization", bearer(&token))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let err = body(&res);
    assert_eq!(err["error"]["code"], "upstream_error");
    assert_eq!(err["error"]["message"], "data store request failed");
}
