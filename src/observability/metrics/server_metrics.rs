//! # Server Metrics
//!
//! Metrics for the secrets API: HTTP requests, vault operations and seal state.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{IntCounterVec, IntGauge};
use std::sync::LazyLock;

// HTTP metrics
static HTTP_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "passwort_http_requests_total",
            "Total number of HTTP requests by method and status code",
        ),
        &["method", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric - this should never happen")
});

// Vault metrics
static VAULT_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "passwort_vault_operations_total",
            "Total number of vault operations by operation and result",
        ),
        &["operation", "result"],
    )
    .expect("Failed to create VAULT_OPERATIONS_TOTAL metric - this should never happen")
});

static VAULT_SEALED: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "passwort_vault_sealed",
        "Whether the vault is currently sealed (1) or unsealed (0)",
    )
    .expect("Failed to create VAULT_SEALED metric - this should never happen")
});

/// Register server metrics with the registry
pub(crate) fn register_server_metrics() -> Result<()> {
    REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VAULT_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VAULT_SEALED.clone()))?;
    Ok(())
}

pub fn increment_http_requests(method: &str, status: u16) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, status.as_str()])
        .inc();
}

/// Count a vault operation; `result` is `ok` or `error`
pub fn increment_vault_operations(operation: &str, result: &str) {
    VAULT_OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

pub fn set_vault_sealed(sealed: bool) {
    VAULT_SEALED.set(i64::from(sealed));
}
