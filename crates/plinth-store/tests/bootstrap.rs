//! Integration tests for database bootstrap and the repositories.

use plinth_session::SessionStore;
use plinth_store::{
    bootstrap_databases, BootstrapTargets, NewUser, SqlBackend, SqlSessionStore, UserRepository,
};
use std::sync::Arc;
use tempfile::TempDir;

fn targets(dir: &TempDir) -> BootstrapTargets {
    let base = dir.path().display();
    BootstrapTargets {
        pwa_url: format!("sqlite:{base}/pwa.db"),
        pwa_type: "sqlite".to_string(),
        safe_url: format!("sqlite:{base}/safe.db"),
        safe_type: "sqlite".to_string(),
        files_url: format!("sqlite:{base}/files.db"),
        files_type: "sqlite".to_string(),
    }
}

async fn table_names(backend: &SqlBackend) -> Vec<String> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(backend.pool())
            .await
            .unwrap();
    rows.into_iter().map(|(name,)| name).collect()
}

#[tokio::test]
async fn bootstrap_creates_required_schema() {
    let dir = TempDir::new().unwrap();
    let targets = targets(&dir);

    bootstrap_databases(&targets).await.unwrap();

    let pwa = SqlBackend::open(&targets.pwa_url, "sqlite").await.unwrap();
    let safe = SqlBackend::open(&targets.safe_url, "sqlite").await.unwrap();

    let pwa_tables = table_names(&pwa).await;
    for required in
        ["uid", "user", "user_profile", "user_email", "user_disabled", "pin", "role", "user_role"]
    {
        assert!(pwa_tables.iter().any(|t| t == required), "missing table {required}");
    }
    assert!(table_names(&safe).await.iter().any(|t| t == "session"));
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let targets = targets(&dir);

    bootstrap_databases(&targets).await.unwrap();
    bootstrap_databases(&targets).await.unwrap();

    let pwa = SqlBackend::open(&targets.pwa_url, "sqlite").await.unwrap();
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT code, COUNT(*) FROM role GROUP BY code ORDER BY code")
            .fetch_all(pwa.pool())
            .await
            .unwrap();

    assert_eq!(
        rows,
        vec![
            ("admin".to_string(), 1),
            ("dev".to_string(), 1),
            ("editor".to_string(), 1),
            ("moderator".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn create_user_and_roles_roundtrip() {
    let dir = TempDir::new().unwrap();
    let targets = targets(&dir);
    bootstrap_databases(&targets).await.unwrap();

    let pwa = Arc::new(SqlBackend::open(&targets.pwa_url, "sqlite").await.unwrap());
    let repo = UserRepository::new(pwa);

    let record = repo
        .create_user(NewUser {
            alias: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
            birthdate: "1990-05-20".to_string(),
            locale: "es".to_string(),
            region: "".to_string(),
            properties: "{}".to_string(),
        })
        .await
        .unwrap();
    assert!(!record.uid.is_empty());

    // No roles yet.
    assert!(repo.get_roles(&record.uid).await.unwrap().is_empty());

    repo.assign_role(&record.uid, "admin").await.unwrap();
    repo.assign_role(&record.uid, "dev").await.unwrap();
    // Re-assigning must not duplicate.
    repo.assign_role(&record.uid, "admin").await.unwrap();

    let roles = repo.get_roles(&record.uid).await.unwrap();
    assert_eq!(roles, vec!["admin".to_string(), "dev".to_string()]);

    // Unknown role codes are an error.
    assert!(repo.assign_role(&record.uid, "superuser").await.is_err());

    // Duplicate email is rejected.
    let duplicate = repo
        .create_user(NewUser {
            alias: "Ada Again".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            birthdate: "1990-05-20".to_string(),
            locale: "es".to_string(),
            region: "".to_string(),
            properties: "{}".to_string(),
        })
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn session_store_lifecycle() {
    let dir = TempDir::new().unwrap();
    let targets = targets(&dir);
    bootstrap_databases(&targets).await.unwrap();

    let safe = Arc::new(SqlBackend::open(&targets.safe_url, "sqlite").await.unwrap());
    let store = SqlSessionStore::new(safe, 3600);

    assert!(store.get_properties("missing").await.unwrap().is_none());

    store.create("sess1").await.unwrap();
    let props = store.get_properties("sess1").await.unwrap().unwrap();
    assert_eq!(props, serde_json::json!({}));

    store
        .put_properties("sess1", &serde_json::json!({ "user_data": { "userId": "42" } }))
        .await
        .unwrap();
    let props = store.get_properties("sess1").await.unwrap().unwrap();
    assert_eq!(props["user_data"]["userId"], "42");

    store.touch("sess1").await.unwrap();
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}
