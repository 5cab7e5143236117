//! Backend-independent vault state and rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{SplitConfig, VaultError, VaultStatus, CHECK_KEY, CHECK_VALUE};
use crate::crypto::{self, MasterKey};

/// On-disk layout of a vault file
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub sealed: bool,
}

/// Encrypted map plus the in-memory key
#[derive(Debug, Clone)]
pub(crate) struct VaultState {
    data: BTreeMap<String, String>,
    key: Option<MasterKey>,
    split: SplitConfig,
}

impl VaultState {
    pub(crate) fn new(split: SplitConfig) -> Self {
        Self {
            data: BTreeMap::new(),
            key: None,
            split,
        }
    }

    /// Restore from a vault file. The key is never persisted, so a loaded
    /// vault always starts sealed.
    pub(crate) fn from_file(file: VaultFile, split: SplitConfig) -> Self {
        Self {
            data: file.data,
            key: None,
            split,
        }
    }

    pub(crate) fn to_file(&self) -> VaultFile {
        VaultFile {
            data: self.data.clone(),
            sealed: self.key.is_none(),
        }
    }

    fn is_initialized(&self) -> bool {
        self.data.contains_key(CHECK_KEY)
    }

    fn unsealed_key(&self) -> Result<&MasterKey, VaultError> {
        self.key.as_ref().ok_or(VaultError::Sealed)
    }

    fn ensure_user_key(key: &str) -> Result<(), VaultError> {
        if key == CHECK_KEY {
            return Err(VaultError::ReservedKey(key.to_string()));
        }
        Ok(())
    }

    pub(crate) fn get(&self, key: &str) -> Result<String, VaultError> {
        let master = self.unsealed_key()?;
        Self::ensure_user_key(key)?;
        let envelope = self
            .data
            .get(key)
            .ok_or_else(|| VaultError::NotFound(key.to_string()))?;
        Ok(crypto::decrypt(master, envelope)?)
    }

    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<(), VaultError> {
        let master = self.unsealed_key()?;
        Self::ensure_user_key(key)?;
        let envelope = crypto::encrypt(master, value.as_bytes())?;
        self.data.insert(key.to_string(), envelope);
        Ok(())
    }

    pub(crate) fn delete(&mut self, key: &str) -> Result<(), VaultError> {
        self.unsealed_key()?;
        Self::ensure_user_key(key)?;
        self.data
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| VaultError::NotFound(key.to_string()))
    }

    pub(crate) fn list(&self) -> Result<Vec<String>, VaultError> {
        self.unsealed_key()?;
        Ok(self
            .data
            .keys()
            .filter(|k| k.as_str() != CHECK_KEY)
            .cloned()
            .collect())
    }

    pub(crate) fn init(&mut self) -> Result<Vec<String>, VaultError> {
        if self.is_initialized() {
            warn!("Refusing to initialize vault twice");
            return Err(VaultError::AlreadyInitialized);
        }

        let master = MasterKey::generate();
        let check = crypto::encrypt(&master, CHECK_VALUE.as_bytes())?;
        let shares = crypto::split_key(&master, self.split.shares, self.split.threshold)?;

        self.data.insert(CHECK_KEY.to_string(), check);
        self.key = None;

        info!(
            "Vault initialized: {} shares, threshold {}",
            self.split.shares, self.split.threshold
        );
        Ok(shares)
    }

    pub(crate) fn seal(&mut self) -> Result<(), VaultError> {
        if self.key.take().is_none() {
            return Err(VaultError::NotUnsealed);
        }
        info!("Vault sealed");
        Ok(())
    }

    pub(crate) fn unseal(&mut self, shares: &[String]) -> Result<(), VaultError> {
        let Some(check) = self.data.get(CHECK_KEY) else {
            return Err(VaultError::NotInitialized);
        };
        if shares.len() < usize::from(self.split.threshold) {
            return Err(VaultError::InsufficientShares {
                required: self.split.threshold,
                provided: shares.len(),
            });
        }

        let candidate = crypto::combine_shares(shares).map_err(|e| {
            debug!("Share combination failed: {}", e);
            VaultError::InvalidShares
        })?;
        match crypto::decrypt(&candidate, check) {
            Ok(plain) if plain == CHECK_VALUE => {}
            _ => {
                warn!("Unseal rejected: shares do not match this vault");
                return Err(VaultError::InvalidShares);
            }
        }

        self.key = Some(candidate);
        info!("Vault unsealed");
        Ok(())
    }

    pub(crate) fn status(&self) -> VaultStatus {
        VaultStatus {
            sealed: self.key.is_none(),
            initialized: self.is_initialized(),
        }
    }
}
