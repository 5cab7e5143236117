//! Client tests against a stub API on a real socket
//!
//! The stub records what it received so tests can check the wire format
//! (bearer header, JSON body, escaped path) the client produces.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use passwort::client::{render, RequestKind, SecretsClient};
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct Stub {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    async fn last(&self) -> Recorded {
        self.requests.lock().await.last().cloned().unwrap()
    }
}

/// Echo handler: DELETE /secrets/gone answers 404, other DELETEs 204,
/// everything else 200 with a fixed body
async fn record(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    stub.requests.lock().await.push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: body.to_vec(),
    });

    match (method, uri.path()) {
        (Method::DELETE, "/api/v1/secrets/gone") => {
            (StatusCode::NOT_FOUND, r#"{"error":"not found"}"#).into_response()
        }
        (Method::DELETE, _) => StatusCode::NO_CONTENT.into_response(),
        _ => (StatusCode::OK, r#"{"key":"foo","value":"bar"}"#).into_response(),
    }
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new().fallback(record).with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api/v1"), stub)
}

#[tokio::test]
async fn test_set_posts_json_with_bearer() {
    let (base, stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "tok-123").unwrap();

    let outcome = client.set("foo", "bar").await;
    assert_eq!(
        render(RequestKind::Set, outcome),
        r#"{"key":"foo","value":"bar"}"#
    );

    let req = stub.last().await;
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/api/v1/secrets");
    assert_eq!(req.authorization.as_deref(), Some("Bearer tok-123"));
    assert_eq!(req.content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(body, serde_json::json!({ "key": "foo", "value": "bar" }));
}

#[tokio::test]
async fn test_empty_key_and_value_are_sent() {
    let (base, stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "tok").unwrap();

    client.set("", "").await.unwrap();

    let body: Value = serde_json::from_slice(&stub.last().await.body).unwrap();
    assert_eq!(body, serde_json::json!({ "key": "", "value": "" }));
}

#[tokio::test]
async fn test_missing_token_still_sends_bearer_header() {
    let (base, stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "").unwrap();

    client.get("foo").await.unwrap();

    // trailing whitespace of header values is dropped by the HTTP parser
    let auth = stub.last().await.authorization.unwrap();
    assert_eq!(auth.trim_end(), "Bearer");
}

#[tokio::test]
async fn test_get_uses_key_as_single_segment() {
    let (base, stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "tok").unwrap();

    client.get("a/b").await.unwrap();

    let req = stub.last().await;
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/api/v1/secrets/a%2Fb");
}

#[tokio::test]
async fn test_delete_renders_deleted_on_204() {
    let (base, stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "tok").unwrap();

    let outcome = client.delete("foo").await;
    assert_eq!(render(RequestKind::Delete, outcome), "Deleted.");

    let req = stub.last().await;
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.path, "/api/v1/secrets/foo");
}

#[tokio::test]
async fn test_delete_renders_body_on_other_status() {
    let (base, _stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "tok").unwrap();

    let outcome = client.delete("gone").await;
    assert_eq!(
        render(RequestKind::Delete, outcome),
        r#"{"error":"not found"}"#
    );
}

#[tokio::test]
async fn test_unseal_sends_shares() {
    let (base, stub) = spawn_stub().await;
    let client = SecretsClient::new(&base, "tok").unwrap();

    let shares = vec!["s1".to_string(), "s2".to_string()];
    client.unseal(&shares).await.unwrap();

    let req = stub.last().await;
    assert_eq!(req.path, "/api/v1/sys/unseal");
    let body: Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(body, serde_json::json!({ "shares": ["s1", "s2"] }));
}

#[tokio::test]
async fn test_transport_error_is_rendered() {
    // bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SecretsClient::new(&format!("http://{addr}/api/v1"), "tok").unwrap();
    let outcome = client.get("foo").await;
    assert!(outcome.is_err());

    let rendered = render(RequestKind::Get, outcome);
    assert!(!rendered.is_empty());
    assert!(rendered.contains("error"), "unexpected rendering: {rendered}");
}
