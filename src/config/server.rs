//! # Server Configuration
//!
//! HTTP server and vault settings loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::vault::SplitConfig;

/// Vault backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "file" | "json" => Ok(StoreBackend::File),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Server configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the API listens on
    pub listen_addr: String,
    /// Bearer token required on `/api/v1` routes
    /// Unset or empty means the API is open
    pub auth_token: Option<String>,
    /// Which vault backend to use
    pub store: StoreBackend,
    /// Vault file for the file backend
    pub vault_path: PathBuf,
    /// Shamir split applied on init
    pub split: SplitConfig,
    /// How long in-flight requests may drain on shutdown (seconds)
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            auth_token: None,
            store: StoreBackend::Memory,
            vault_path: PathBuf::from(DEFAULT_VAULT_PATH),
            split: SplitConfig::default(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Split out from [`ServerConfig::from_env`] so tests don't have to mutate
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        use crate::constants::*;
        Self {
            listen_addr: lookup("PASSWORT_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            auth_token: lookup("PASSWORT_AUTH_TOKEN").filter(|t| !t.is_empty()),
            store: var_or_default(&lookup, "PASSWORT_STORE", StoreBackend::Memory),
            vault_path: lookup("PASSWORT_VAULT_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_VAULT_PATH), PathBuf::from),
            split: SplitConfig {
                shares: var_or_default(&lookup, "PASSWORT_SHARES", DEFAULT_KEY_SHARES),
                threshold: var_or_default(&lookup, "PASSWORT_THRESHOLD", DEFAULT_KEY_THRESHOLD),
            },
            shutdown_timeout_secs: var_or_default(
                &lookup,
                "PASSWORT_SHUTDOWN_TIMEOUT_SECS",
                DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            ),
        }
    }
}

/// Read a variable through `lookup` or return the default value
fn var_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
