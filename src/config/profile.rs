//! # Client Profile
//!
//! Client-local storage for `passwortctl`: the API base URL, the auth token
//! and the light/dark theme preference. Stored as JSON, by default at
//! `<config_dir>/passwort/profile.json`.
//!
//! The token is kept verbatim; it has no expiry, rotation or validation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::{DEFAULT_API_URL, PROFILE_DIR_NAME, PROFILE_FILE_NAME};

/// Profile errors
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("failed to read profile {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write profile {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("profile {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Display theme preference
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon of the toggle control: the theme you would switch *to*
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_token: None,
            theme: Theme::default(),
        }
    }
}

/// Default profile location: `<config_dir>/passwort/profile.json`
///
/// # Errors
///
/// Returns [`ProfileError::NoConfigDir`] if the platform has no config directory.
pub fn default_profile_path() -> Result<PathBuf, ProfileError> {
    dirs::config_dir()
        .map(|dir| dir.join(PROFILE_DIR_NAME).join(PROFILE_FILE_NAME))
        .ok_or(ProfileError::NoConfigDir)
}

impl ClientProfile {
    /// Load the profile at `path`, or the defaults if the file doesn't exist yet
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| ProfileError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No profile at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ProfileError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write the profile to `path`, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        let write_err = |source: std::io::Error| ProfileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(self).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, body).map_err(write_err)?;
        restrict_permissions(path).map_err(write_err)?;
        debug!("Saved profile to {}", path.display());
        Ok(())
    }

    /// Token to attach to requests; a missing token is sent as empty
    pub fn token_or_empty(&self) -> &str {
        self.auth_token.as_deref().unwrap_or("")
    }
}

/// The profile holds a credential, keep it owner-readable only
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Mask a token for display, one bullet per character
pub fn mask_token(token: &str) -> String {
    "•".repeat(token.chars().count())
}
