//! Cookie-session screens

use riskhub_core::{tables, UserRole};
use riskhub_server::routes::routes;
use riskhub_server::{AppState, ServerConfig};
use riskhub_test_utils::{today, TestBackend, ORG_A};
use warp::http::StatusCode;

fn state(backend: &TestBackend) -> AppState {
    AppState::new(
        backend.store.clone(),
        backend.auth.clone(),
        ServerConfig::memory(),
    )
    .with_today(today())
}

fn html(res: &warp::http::Response<warp::hyper::body::Bytes>) -> String {
    String::from_utf8_lossy(res.body()).into_owned()
}

fn cookie(token: &str) -> String {
    format!("access_token={token}")
}

#[tokio::test]
async fn screens_redirect_to_login_without_session() {
    let backend = TestBackend::new();
    let app = routes(state(&backend));

    for path in ["/app/dashboard", "/app/risks", "/app/swot", "/app/kri", "/app/rencana-strategis"] {
        let res = warp::test::request().path(path).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(res.headers()["location"], "/login", "{path}");
    }

    let res = warp::test::request().path("/").reply(&app).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/app/dashboard");
}

#[tokio::test]
async fn login_form_sets_an_http_only_cookie() {
    let backend = TestBackend::new();
    backend.add_account("staf@rs.id", "rahasia", UserRole::User, Some(ORG_A));
    let app = routes(state(&backend));

    let res = warp::test::request().path("/login").reply(&app).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(html(&res).contains("name=\"password\""));

    let res = warp::test::request()
        .method("POST")
        .path("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("email=staf%40rs.id&password=salah")
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(html(&res).contains("Email atau kata sandi salah"));

    let res = warp::test::request()
        .method("POST")
        .path("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("email=staf%40rs.id&password=rahasia")
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/app/dashboard");
    let set_cookie = res.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn screens_render_the_organizations_rows() {
    let backend = TestBackend::new();
    backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Viewer, Some(ORG_A));
    let app = routes(state(&backend));

    let get = |path: &'static str| {
        warp::test::request()
            .path(path)
            .header("cookie", cookie(&token))
    };

    let res = get("/app/dashboard").reply(&app).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(html(&res).contains("Total risiko: <strong>2</strong>"));

    let page = html(&get("/app/risks").reply(&app).await);
    assert!(page.contains("R-IGD-001"));
    assert!(page.contains("class=\"overdue\""));
    assert!(!page.contains("Hapus"));

    let page = html(&get("/app/swot").reply(&app).await);
    assert!(page.contains("SDM tersertifikasi"));

    let page = html(&get("/app/kri").reply(&app).await);
    assert!(page.contains("KRI-02"));

    let page = html(&get("/app/rencana-strategis").reply(&app).await);
    assert!(page.contains("RENSTRA-2025"));
    assert!(page.contains("90.0%"));
}

#[tokio::test]
async fn delete_form_redirects_back_to_the_screen() {
    let backend = TestBackend::new();
    let seeded = backend.seed_organization(ORG_A);
    let token = backend.login_as(UserRole::Manager, Some(ORG_A));
    let app = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path(&format!("/app/risks/{}/delete", seeded.risks[1].id))
        .header("cookie", cookie(&token))
        .reply(&app)
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/app/risks");
    assert_eq!(backend.store.count(tables::RISK_INPUTS), 1);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let backend = TestBackend::new();
    let token = backend.login_as(UserRole::User, Some(ORG_A));
    let app = routes(state(&backend));

    let res = warp::test::request()
        .method("POST")
        .path("/logout")
        .header("cookie", cookie(&token))
        .reply(&app)
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/login");
    assert!(res.headers()["set-cookie"]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
    assert_eq!(backend.auth.session_count(), 0);
}
