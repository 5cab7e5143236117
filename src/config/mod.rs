//! # Configuration
//!
//! - `server` - server settings loaded from environment variables with defaults
//! - `profile` - the client profile (API URL, auth token, theme) persisted as JSON

mod profile;
mod server;

pub use profile::{default_profile_path, mask_token, ClientProfile, ProfileError, Theme};
pub use server::{ServerConfig, StoreBackend};
