//! # Constants
//!
//! Default values shared by the server, the client and the tools.

/// Default server listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default API base URL used by the client
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Default vault file path for the file backend
pub const DEFAULT_VAULT_PATH: &str = "vault.json";

/// Number of key shares produced on init
pub const DEFAULT_KEY_SHARES: u8 = 3;

/// Number of key shares required to unseal
pub const DEFAULT_KEY_THRESHOLD: u8 = 2;

/// Graceful shutdown drain timeout (seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Client profile directory name under the user's config dir
pub const PROFILE_DIR_NAME: &str = "passwort";

/// Client profile file name
pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Rendered when a DELETE answers 204 No Content
pub const DELETED_MESSAGE: &str = "Deleted.";
