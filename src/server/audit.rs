//! Request audit logging
//!
//! One log line per request with method, path, status, latency, client
//! address and a request ID. Bodies are never logged, so neither are secret
//! values or shares.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::observability::metrics::increment_http_requests;

/// Response header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn audit(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string());
    let request_id = Uuid::new_v4().to_string();

    let span = tracing::info_span!("request", id = %request_id);
    let start = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status();

    increment_http_requests(method.as_str(), status.as_u16());

    let _guard = span.enter();
    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = latency_ms,
            client = %client,
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = latency_ms,
            client = %client,
            "Request completed"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
