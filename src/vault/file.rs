use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::state::{VaultFile, VaultState};
use super::{SplitConfig, Store, VaultError, VaultStatus};

/// Vault persisted to a JSON file
///
/// The file holds `{"data": {...}, "sealed": bool}` with every value
/// encrypted. It is rewritten after each mutation while the write lock is
/// held, via a temporary file and a rename. A mutation only becomes visible
/// in memory once that write has succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: RwLock<VaultState>,
    split: SplitConfig,
}

impl FileStore {
    /// Open the vault file at `path`, starting empty if it does not exist
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>, split: SplitConfig) -> Result<Self, VaultError> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: VaultFile = serde_json::from_slice(&bytes)?;
                info!(
                    "Loaded vault file {} ({} entries)",
                    path.display(),
                    file.data.len()
                );
                VaultState::from_file(file, split)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No vault file at {}, starting empty", path.display());
                VaultState::new(split)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
            split,
        })
    }

    async fn persist(&self, state: &VaultState) -> Result<(), VaultError> {
        let body = serde_json::to_vec_pretty(&state.to_file())?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted vault file {}", self.path.display());
        Ok(())
    }

    /// Apply `op` to a copy of the state, persist the copy, then swap it in
    async fn commit<T>(
        &self,
        op: impl FnOnce(&mut VaultState) -> Result<T, VaultError> + Send,
    ) -> Result<T, VaultError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = op(&mut next)?;
        if let Err(e) = self.persist(&next).await {
            warn!("Vault file write failed, change discarded: {}", e);
            return Err(e);
        }
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<String, VaultError> {
        self.state.read().await.get(key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.commit(|state| state.set(key, value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), VaultError> {
        self.commit(|state| state.delete(key)).await
    }

    async fn list(&self) -> Result<Vec<String>, VaultError> {
        self.state.read().await.list()
    }

    async fn init(&self) -> Result<Vec<String>, VaultError> {
        self.commit(VaultState::init).await
    }

    async fn seal(&self) -> Result<(), VaultError> {
        self.commit(VaultState::seal).await
    }

    async fn unseal(&self, shares: &[String]) -> Result<(), VaultError> {
        self.commit(|state| state.unseal(shares)).await
    }

    async fn status(&self) -> VaultStatus {
        self.state.read().await.status()
    }

    fn threshold(&self) -> u8 {
        self.split.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("vault.json"), SplitConfig::default())
            .await
            .unwrap();
        let status = store.status().await;
        assert!(status.sealed);
        assert!(!status.initialized);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data_and_starts_sealed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::open(&path, SplitConfig::default()).await.unwrap();
        let shares = store.init().await.unwrap();
        store.unseal(&shares[..2]).await.unwrap();
        store.set("foo", "bar").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path, SplitConfig::default()).await.unwrap();
        assert!(reopened.status().await.sealed);
        assert!(matches!(reopened.get("foo").await, Err(VaultError::Sealed)));

        reopened.unseal(&shares[1..]).await.unwrap();
        assert_eq!(reopened.get("foo").await.unwrap(), "bar");
        assert_eq!(reopened.list().await.unwrap(), vec!["foo"]);
    }

    #[tokio::test]
    async fn test_file_never_contains_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::open(&path, SplitConfig::default()).await.unwrap();
        let shares = store.init().await.unwrap();
        store.unseal(&shares).await.unwrap();
        store.set("api-key", "super-secret-value").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("api-key"));
        assert!(!raw.contains("super-secret-value"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileStore::open(&path, SplitConfig::default()).await;
        assert!(matches!(result, Err(VaultError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_seal_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::open(&path, SplitConfig::default()).await.unwrap();
        let shares = store.init().await.unwrap();
        store.unseal(&shares[..2]).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let file: VaultFile = serde_json::from_str(&raw).unwrap();
        assert!(!file.sealed);

        store.seal().await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let file: VaultFile = serde_json::from_str(&raw).unwrap();
        assert!(file.sealed);
    }

    /// A directory at the tmp path makes every write fail
    fn block_writes(path: &std::path::Path) -> PathBuf {
        let tmp = path.with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();
        tmp
    }

    #[tokio::test]
    async fn test_failed_init_write_leaves_vault_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let store = FileStore::open(&path, SplitConfig::default()).await.unwrap();

        let tmp = block_writes(&path);
        assert!(matches!(store.init().await, Err(VaultError::Io(_))));
        assert!(!store.status().await.initialized);
        assert!(!path.exists());

        std::fs::remove_dir(&tmp).unwrap();
        let shares = store.init().await.unwrap();
        assert_eq!(shares.len(), 3);
        store.unseal(&shares[..2]).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_writes_are_not_applied_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let store = FileStore::open(&path, SplitConfig::default()).await.unwrap();
        let shares = store.init().await.unwrap();
        store.unseal(&shares[..2]).await.unwrap();
        store.set("kept", "v1").await.unwrap();

        let tmp = block_writes(&path);

        assert!(store.set("foo", "bar").await.is_err());
        assert!(matches!(store.get("foo").await, Err(VaultError::NotFound(_))));

        assert!(store.set("kept", "v2").await.is_err());
        assert_eq!(store.get("kept").await.unwrap(), "v1");

        assert!(store.delete("kept").await.is_err());
        assert_eq!(store.get("kept").await.unwrap(), "v1");

        assert!(store.seal().await.is_err());
        assert!(!store.status().await.sealed);

        std::fs::remove_dir(&tmp).unwrap();
        store.seal().await.unwrap();

        let tmp = block_writes(&path);
        assert!(store.unseal(&shares[..2]).await.is_err());
        assert!(store.status().await.sealed);

        std::fs::remove_dir(&tmp).unwrap();
        store.unseal(&shares[..2]).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["kept"]);
    }
}
