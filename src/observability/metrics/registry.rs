//! # Metrics Registry
//!
//! Prometheus metrics registry setup and registration.

use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;

/// Global Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Register all metrics with the Prometheus registry
///
/// Safe to call more than once; only the first call registers.
/// Prometheus Registry::register() takes ownership (Box<dyn Collector>),
/// so the metrics are cloned. Metrics are Arc-backed internally.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    super::server_metrics::register_server_metrics()?;

    Ok(())
}

/// Encode every registered metric in the Prometheus text format
///
/// # Errors
///
/// Fails if a metric family cannot be encoded.
pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Content type of [`gather_metrics`] output
pub fn metrics_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
