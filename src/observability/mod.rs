//! # Observability
//!
//! Logging setup and Prometheus metrics.
//!
//! ## Sub-modules
//!
//! - `metrics` - Prometheus registry plus HTTP and vault metrics

pub mod metrics;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used
/// (e.g. `passwort=info`). Output goes to stderr so that stdout stays
/// reserved for command output.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
