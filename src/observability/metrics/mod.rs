//! # Metrics Module
//!
//! Prometheus metrics for the secrets server, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text exposition
//! - `server_metrics` - HTTP request and vault lifecycle metrics

pub mod registry;
pub mod server_metrics;

pub use registry::*;
pub use server_metrics::*;
