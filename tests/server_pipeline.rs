//! End-to-end tests for the HTTP stack: host guard, security headers,
//! dispatch pipeline, and cookie behavior over real SQLite databases.

use actix_web::{test, web, App};
use plinth_api::{routes, AppState, ComponentRegistry};
use plinth_server::config::ServerConfig;
use plinth_server::middleware;
use plinth_store::{bootstrap_databases, BootstrapTargets, SqlBackend, SqlSessionStore, UserRepository};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

async fn build_state(dir: &TempDir, config: &ServerConfig) -> web::Data<AppState> {
    let base = dir.path().display();
    let targets = BootstrapTargets {
        pwa_url: format!("sqlite:{base}/pwa.db"),
        pwa_type: "sqlite".to_string(),
        safe_url: format!("sqlite:{base}/safe.db"),
        safe_type: "sqlite".to_string(),
        files_url: format!("sqlite:{base}/files.db"),
        files_type: "sqlite".to_string(),
    };
    bootstrap_databases(&targets).await.unwrap();

    let pwa = Arc::new(SqlBackend::open(&targets.pwa_url, "sqlite").await.unwrap());
    let safe = Arc::new(SqlBackend::open(&targets.safe_url, "sqlite").await.unwrap());

    let mut registry = ComponentRegistry::new();
    registry.register_component("cmp_2300_ftoken", Uuid::new_v4(), "/component/cmp_2300_ftoken");

    web::Data::new(AppState::new(
        config.app_settings(),
        registry,
        Arc::new(SqlSessionStore::new(safe, config.session.ttl_seconds)),
        Arc::new(UserRepository::new(pwa)),
    ))
}

macro_rules! test_app {
    ($state:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(middleware::SecurityHeaders::from_config($config))
                .wrap(middleware::HostGuard::from_config($config))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn healthcheck_carries_security_headers() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get().uri("/healthcheck").to_request();
    let res = test::call_service(&app, req).await;

    assert!(res.status().is_success());
    let headers = res.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(
        headers.get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
    assert!(headers.get("permissions-policy").is_none());
    assert!(headers.get("content-security-policy").is_some());
}

#[actix_web::test]
async fn permissions_policy_sent_when_configured() {
    let dir = TempDir::new().unwrap();
    let mut config = ServerConfig::default();
    config.security.permissions_policy =
        Some("geolocation=(), microphone=(), camera=(), payment=()".to_string());
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get().uri("/healthcheck").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(
        res.headers().get("permissions-policy").unwrap(),
        "geolocation=(), microphone=(), camera=(), payment=()"
    );
}

#[actix_web::test]
async fn rejects_disallowed_host() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Host", "evil.example"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn accepts_allowed_host() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Host", "localhost"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
}

#[actix_web::test]
async fn plain_navigation_sets_cookies_and_nonced_csp() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get().uri("/").to_request();
    let res = test::call_service(&app, req).await;

    assert!(res.status().is_success());

    let csp = res.headers().get("content-security-policy").unwrap().to_str().unwrap();
    assert!(csp.contains("'nonce-"), "CSP must carry the per-request nonce: {csp}");

    let cookies: Vec<String> = res
        .headers()
        .get_all("set-cookie")
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    for name in [
        "plinth_session",
        "plinth_utoken",
        "plinth_theme",
        "plinth_theme_color",
        "plinth_lang",
        "plinth_tab_changes",
    ] {
        assert!(
            cookies.iter().any(|c| c.starts_with(&format!("{name}="))),
            "missing cookie {name} in {cookies:?}"
        );
    }

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["CURRENT_USER"]["auth"], false);
    assert_eq!(body["CURRENT_USER"]["roles"], serde_json::json!({}));
    assert!(body["CSP_NONCE"].as_str().is_some());
    assert!(body["LTOKEN"].as_str().is_some());
}

#[actix_web::test]
async fn ajax_request_sets_no_cookies() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Requested-With-Ajax", "fetch"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert!(res.status().is_success());
    assert!(res.headers().get("set-cookie").is_none());
}

#[actix_web::test]
async fn ftoken_route_requires_ajax() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    let req = test::TestRequest::get().uri("/ftoken/contact/f1/main").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/ftoken/contact/f1/main")
        .insert_header(("Requested-With-Ajax", "fetch"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());

    let body: serde_json::Value = test::read_body_json(res).await;
    assert!(body["ftoken"].as_str().is_some());
    assert_eq!(body["dispatch_result"], true);
    assert_eq!(body["CURRENT_COMP_NAME"], "cmp_2300_ftoken");
}

#[actix_web::test]
async fn session_survives_across_requests() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default();
    let state = build_state(&dir, &config).await;
    let app = test_app!(state, &config);

    // First visit creates the session.
    let req = test::TestRequest::get().uri("/").to_request();
    let res = test::call_service(&app, req).await;
    let session_cookie = res
        .headers()
        .get_all("set-cookie")
        .map(|v| v.to_str().unwrap())
        .find(|c| c.starts_with("plinth_session="))
        .unwrap()
        .to_string();
    let session_id =
        session_cookie.trim_start_matches("plinth_session=").split(';').next().unwrap().to_string();

    // Second visit with the cookie keeps the same session id.
    let req = test::TestRequest::get()
        .uri("/")
        .cookie(actix_web::cookie::Cookie::new("plinth_session", session_id.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["SESSION"], serde_json::Value::String(session_id));
}
