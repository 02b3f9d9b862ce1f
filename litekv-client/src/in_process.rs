use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use litekv_core::{Error, Result, Value};
use litekv_store::{StorageEntry, StoreManager};

use crate::client::StorageClient;

/// A [`StorageClient`] that talks directly to an in-process
/// [`StoreManager`], skipping the network hop. Used by integration tests
/// (and anywhere else the cache and the store are deployed in the same
/// process) to exercise the write-through/fallback-populate contract
/// without a live HTTP server.
pub struct InProcessStorageClient {
    manager: Arc<StoreManager>,
    enabled: AtomicBool,
}

impl InProcessStorageClient {
    pub fn new(manager: Arc<StoreManager>) -> Self {
        Self {
            manager,
            enabled: AtomicBool::new(true),
        }
    }

    fn guard(&self) -> Result<()> {
        if !self.is_enabled() {
            return Err(Error::Unavailable("storage client is disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageClient for InProcessStorageClient {
    async fn available(&self) -> bool {
        self.is_enabled()
    }

    async fn save(&self, key: &str, value: Value) -> Result<StorageEntry> {
        self.guard()?;
        self.manager.save(key, value).await
    }

    async fn load(&self, key: &str) -> Result<Option<StorageEntry>> {
        self.guard()?;
        self.manager.read(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.guard()?;
        self.manager.delete(key).await
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litekv_store::{PartitionedStore, StoreManagerConfig};

    async fn client_in_tmp() -> (InProcessStorageClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PartitionedStore::new(dir.path()));
        store.initialize().await.unwrap();
        let manager = Arc::new(StoreManager::new(store, StoreManagerConfig::default()));
        (InProcessStorageClient::new(manager), dir)
    }

    #[tokio::test]
    async fn save_then_load_round_trips_without_a_network_hop() {
        let (client, _dir) = client_in_tmp().await;
        client.save("a", Value::Int(7)).await.unwrap();
        let loaded = client.load("a").await.unwrap().unwrap();
        assert_eq!(loaded.value, Value::Int(7));
    }

    #[tokio::test]
    async fn disabling_blocks_further_calls() {
        let (client, _dir) = client_in_tmp().await;
        client.save("a", Value::Int(1)).await.unwrap();
        client.disable();
        assert!(!client.available().await);
        assert!(client.load("a").await.is_err());
        client.enable();
        assert!(client.load("a").await.unwrap().is_some());
    }
}
