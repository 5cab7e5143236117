//! Bearer token middleware for the `/api/v1` routes

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::AppState;

/// Reject requests whose bearer token differs from the configured one
///
/// With no token configured every request passes. The credential is the
/// `Authorization` header with a leading `Bearer ` stripped; a header without
/// that prefix is compared as a whole, in constant time. Rejections are a
/// bare 401.
pub async fn require_bearer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(req).await;
    };

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "Rejected request with missing or wrong bearer token"
        );
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::HeaderValue, middleware, routing::get, Router};
    use axum_test::TestServer;

    use super::*;
    use crate::vault::MemoryStore;

    fn guarded(token: &str) -> TestServer {
        let state = AppState::new(Arc::new(MemoryStore::default()), Some(token.to_string()));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_token_must_match_exactly() {
        let server = guarded("secret");

        server.get("/").authorization_bearer("secret").await.assert_status_ok();
        for wrong in ["secre", "secret2", "SECRET", ""] {
            server
                .get("/")
                .authorization_bearer(wrong)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_header_without_bearer_prefix_is_compared_whole() {
        let server = guarded("secret");

        server
            .get("/")
            .add_header(AUTHORIZATION, HeaderValue::from_static("secret"))
            .await
            .assert_status_ok();
        server
            .get("/")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Basic secret"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
