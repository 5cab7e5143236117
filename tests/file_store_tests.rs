//! File-backed vault across a server restart

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use passwort::server::{router, AppState};
use passwort::vault::{FileStore, SplitConfig, Store};
use serde_json::{json, Value};

async fn server_for(path: &std::path::Path) -> TestServer {
    let store: Arc<dyn Store> = Arc::new(
        FileStore::open(path, SplitConfig::default())
            .await
            .unwrap(),
    );
    TestServer::new(router(AppState::new(store, None))).unwrap()
}

#[tokio::test]
async fn test_secrets_survive_restart_and_need_unseal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.json");

    let server = server_for(&path).await;
    let body: Value = server.post("/api/v1/sys/init").await.json();
    let shares: Vec<String> = serde_json::from_value(body["shares"].clone()).unwrap();
    server
        .post("/api/v1/sys/unseal")
        .json(&json!({ "shares": &shares[1..] }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/secrets")
        .json(&json!({ "key": "db", "value": "hunter2" }))
        .await
        .assert_status(StatusCode::CREATED);
    drop(server);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("hunter2"));

    // reopened vault starts sealed
    let server = server_for(&path).await;
    server
        .get("/api/v1/secrets/db")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    server
        .post("/api/v1/sys/unseal")
        .json(&json!({ "shares": &shares[..2] }))
        .await
        .assert_status_ok();
    server
        .get("/api/v1/secrets/db")
        .await
        .assert_json(&json!({ "key": "db", "value": "hunter2" }));
}
