use async_trait::async_trait;
use tokio::sync::RwLock;

use super::state::VaultState;
use super::{SplitConfig, Store, VaultError, VaultStatus};

/// In-memory vault
///
/// Suitable for tests and for deployments where losing all secrets on
/// restart is acceptable.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<VaultState>,
    split: SplitConfig,
}

impl MemoryStore {
    pub fn new(split: SplitConfig) -> Self {
        Self {
            state: RwLock::new(VaultState::new(split)),
            split,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(SplitConfig::default())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<String, VaultError> {
        self.state.read().await.get(key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.state.write().await.set(key, value)
    }

    async fn delete(&self, key: &str) -> Result<(), VaultError> {
        self.state.write().await.delete(key)
    }

    async fn list(&self) -> Result<Vec<String>, VaultError> {
        self.state.read().await.list()
    }

    async fn init(&self) -> Result<Vec<String>, VaultError> {
        self.state.write().await.init()
    }

    async fn seal(&self) -> Result<(), VaultError> {
        self.state.write().await.seal()
    }

    async fn unseal(&self, shares: &[String]) -> Result<(), VaultError> {
        self.state.write().await.unseal(shares)
    }

    async fn status(&self) -> VaultStatus {
        self.state.read().await.status()
    }

    fn threshold(&self) -> u8 {
        self.split.threshold
    }
}
