//! Shared API path definitions for the passwort secrets API
//!
//! This crate centralizes all API paths so that the server's axum routes and
//! the client's request URLs cannot drift apart.
//!
//! ## Route Constants
//!
//! Route constants are relative to [`API_PREFIX`] and use axum 0.8 capture
//! syntax (`{id}`). They are validated against the segment helpers in tests.
//!
//! ## Segments
//!
//! [`Segments`] yields the path segments for an operation, which the client
//! pushes onto its base URL one by one so that keys are escaped as a single
//! segment.

/// Version prefix every authenticated route is nested under
pub const API_PREFIX: &str = "/api/v1";

/// Collection route: create (POST) and list (GET)
pub const SECRETS: &str = "/secrets";

/// Item route: get (GET), update (PUT), delete (DELETE)
pub const SECRET_BY_ID: &str = "/secrets/{id}";

pub const SYS_INIT: &str = "/sys/init";
pub const SYS_SEAL: &str = "/sys/seal";
pub const SYS_UNSEAL: &str = "/sys/unseal";
pub const SYS_STATUS: &str = "/sys/status";

/// Unauthenticated probe and metrics routes (not nested under the prefix)
pub const HEALTHZ: &str = "/healthz";
pub const READYZ: &str = "/readyz";
pub const METRICS: &str = "/metrics";

/// API operations with their relative path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segments<'a> {
    Secrets,
    Secret(&'a str),
    Init,
    Seal,
    Unseal,
    Status,
}

impl<'a> Segments<'a> {
    /// Path segments relative to the API base (`.../api/v1`)
    pub fn to_vec(self) -> Vec<&'a str> {
        match self {
            Segments::Secrets => vec!["secrets"],
            Segments::Secret(key) => vec!["secrets", key],
            Segments::Init => vec!["sys", "init"],
            Segments::Seal => vec!["sys", "seal"],
            Segments::Unseal => vec!["sys", "unseal"],
            Segments::Status => vec!["sys", "status"],
        }
    }

    /// Unescaped relative path, e.g. `/secrets/foo`
    ///
    /// Only meant for logging; requests must be built from [`Segments::to_vec`].
    pub fn display_path(self) -> String {
        format!("/{}", self.to_vec().join("/"))
    }
}
