//! # Vault
//!
//! Encrypted key-value storage guarded by a master key that only lives in
//! memory while the vault is unsealed.
//!
//! ## Lifecycle
//!
//! 1. **Init** - generate a master key, store an encrypted check value, split the
//!    key into Shamir shares and hand them out. The vault stays sealed.
//! 2. **Unseal** - combine at least `threshold` shares, verify against the check
//!    value, keep the key in memory.
//! 3. **Seal** - wipe the key. Data operations fail until the next unseal.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - in-memory only, lost on restart
//! - [`FileStore`] - persists the encrypted map to a JSON file after every mutation

mod file;
mod memory;
mod state;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use state::VaultFile;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::crypto::CryptoError;

/// Reserved entry holding the encrypted check value
pub const CHECK_KEY: &str = ".vault_check";

/// Plaintext of the check entry
pub const CHECK_VALUE: &str = "vault-check";

/// Vault errors
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault is sealed")]
    Sealed,

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("key is reserved: {0}")]
    ReservedKey(String),

    #[error("vault already initialized")]
    AlreadyInitialized,

    #[error("vault is not initialized")]
    NotInitialized,

    #[error("vault is not unsealed")]
    NotUnsealed,

    #[error("at least {required} shares required, got {provided}")]
    InsufficientShares { required: u8, provided: usize },

    #[error("invalid shares or wrong vault")]
    InvalidShares,

    #[error("invalid key split: {shares} shares with threshold {threshold} (need 2 <= threshold <= shares)")]
    InvalidSplit { shares: u8, threshold: u8 },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("vault file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("vault file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// How the master key is split on init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    pub shares: u8,
    pub threshold: u8,
}

impl Default for SplitConfig {
    fn default() -> Self {
        use crate::constants::{DEFAULT_KEY_SHARES, DEFAULT_KEY_THRESHOLD};
        Self {
            shares: DEFAULT_KEY_SHARES,
            threshold: DEFAULT_KEY_THRESHOLD,
        }
    }
}

impl SplitConfig {
    /// Check that `2 <= threshold <= shares`
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidSplit`] otherwise.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.threshold < 2 || self.threshold > self.shares {
            return Err(VaultError::InvalidSplit {
                shares: self.shares,
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}

/// Snapshot of the vault lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VaultStatus {
    pub sealed: bool,
    pub initialized: bool,
}

impl VaultStatus {
    pub fn as_str(&self) -> &'static str {
        if self.sealed {
            "sealed"
        } else {
            "unsealed"
        }
    }
}

/// Storage backend for the secrets API
///
/// Implementations share one set of rules (see the module docs); they only
/// differ in where the encrypted map lives.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Decrypt and return the value stored under `key`.
    async fn get(&self, key: &str) -> Result<String, VaultError>;
    /// Encrypt and store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError>;
    /// Remove `key`.
    async fn delete(&self, key: &str) -> Result<(), VaultError>;
    /// All user keys, sorted. The check entry is never included.
    async fn list(&self) -> Result<Vec<String>, VaultError>;
    /// Initialize a fresh vault and return the key shares.
    async fn init(&self) -> Result<Vec<String>, VaultError>;
    /// Wipe the master key from memory.
    async fn seal(&self) -> Result<(), VaultError>;
    /// Reconstruct and verify the master key from shares.
    async fn unseal(&self, shares: &[String]) -> Result<(), VaultError>;
    /// Current lifecycle state.
    async fn status(&self) -> VaultStatus;
    /// Number of shares required to unseal.
    fn threshold(&self) -> u8;
}
