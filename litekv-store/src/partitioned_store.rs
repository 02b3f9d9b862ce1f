use std::path::{Path, PathBuf};
use std::sync::Arc;

use litekv_core::{key::validate_key, Clock, Error, Result, SystemClock, Value, MAX_STORE_VALUE_BYTES};
use tokio::fs;
use tracing::warn;

use crate::entry::{EntryMetadata, StorageEntry, StoreStats};
use crate::layout::{encode_filename, partition_dir_name, partition_of, PARTITION_COUNT};

/// A durable, per-key file store. Every key lives in exactly one file, under
/// one of [`PARTITION_COUNT`] partition directories selected by
/// `djb2(key) mod 16`.
pub struct PartitionedStore {
    data_root: PathBuf,
    clock: Arc<dyn Clock>,
    max_value_bytes: usize,
}

impl PartitionedStore {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self::with_clock(data_root, Arc::new(SystemClock))
    }

    pub fn with_clock(data_root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_root: data_root.into(),
            clock,
            max_value_bytes: MAX_STORE_VALUE_BYTES,
        }
    }

    /// Overrides the per-value size cap, normally `MAX_STORE_VALUE_BYTES`.
    /// Exposed for the store server's `MAX_FILE_SIZE` configuration knob.
    pub fn with_max_value_bytes(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = max_value_bytes;
        self
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Creates the data root and every partition directory. Idempotent.
    pub async fn initialize(&self) -> Result<()> {
        for partition in 0..PARTITION_COUNT {
            fs::create_dir_all(self.partition_dir(partition)).await?;
        }
        Ok(())
    }

    fn partition_dir(&self, partition: usize) -> PathBuf {
        self.data_root.join(partition_dir_name(partition))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let partition = partition_of(key);
        self.partition_dir(partition).join(format!("{}.json", encode_filename(key)))
    }

    async fn read_entry(path: &Path) -> Result<Option<StorageEntry>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::IoFailure(err)),
        };
        match serde_json::from_slice::<StorageEntry>(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => Err(Error::CorruptEntry(format!(
                "{}: {err}",
                path.display()
            ))),
        }
    }

    /// Writes `value` for `key`, bumping the version if a prior entry
    /// exists. Returns the entry as written.
    pub async fn save(&self, key: &str, value: Value) -> Result<StorageEntry> {
        validate_key(key)?;
        let size = value.approximate_size();
        if size > self.max_value_bytes {
            return Err(Error::ValidationFailure(format!(
                "value size {size} exceeds the {}-byte store limit",
                self.max_value_bytes
            )));
        }

        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let now = self.clock.now_millis();
        let previous = match Self::read_entry(&path).await {
            Ok(prev) => prev,
            Err(err) => {
                warn!(key, error = %err, "overwriting corrupt store entry");
                None
            }
        };
        let metadata = match previous {
            Some(prev) => EntryMetadata {
                created_at: prev.metadata.created_at,
                updated_at: now,
                version: prev.metadata.version + 1,
            },
            None => EntryMetadata {
                created_at: now,
                updated_at: now,
                version: 1,
            },
        };
        let entry = StorageEntry {
            key: key.to_string(),
            value,
            metadata,
        };
        let pretty = serde_json::to_string_pretty(&entry)?;
        fs::write(&path, pretty).await?;
        Ok(entry)
    }

    /// Loads `key`'s entry, or `None` if it has never been saved (or was
    /// deleted).
    pub async fn load(&self, key: &str) -> Result<Option<StorageEntry>> {
        validate_key(key)?;
        Self::read_entry(&self.path_for(key)).await
    }

    /// Deletes `key`'s file. Returns whether a file actually existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Error::IoFailure(err)),
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.load(key).await?.is_some())
    }

    async fn walk_all(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for partition in 0..PARTITION_COUNT {
            let dir = self.partition_dir(partition);
            let mut read_dir = match fs::read_dir(&dir).await {
                Ok(rd) => rd,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(Error::IoFailure(err)),
            };
            while let Some(entry) = read_dir.next_entry().await? {
                if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                    files.push(entry.path());
                }
            }
        }
        Ok(files)
    }

    /// All live keys. Corrupt files are logged and skipped rather than
    /// failing the whole scan.
    pub async fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .get_all_entries()
            .await?
            .into_iter()
            .map(|e| e.key)
            .collect())
    }

    /// All live entries across every partition. A file that fails to parse
    /// is logged and skipped, not fatal to the scan.
    pub async fn get_all_entries(&self) -> Result<Vec<StorageEntry>> {
        let mut entries = Vec::new();
        for path in self.walk_all().await? {
            match Self::read_entry(&path).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable store entry"),
            }
        }
        Ok(entries)
    }

    /// Deletes every stored entry.
    pub async fn clear(&self) -> Result<()> {
        for path in self.walk_all().await? {
            if let Err(err) = fs::remove_file(&path).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    return Err(Error::IoFailure(err));
                }
            }
        }
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<StoreStats> {
        let mut total_size_bytes = 0u64;
        let paths = self.walk_all().await?;
        for path in &paths {
            if let Ok(metadata) = fs::metadata(path).await {
                total_size_bytes += metadata.len();
            }
        }
        Ok(StoreStats {
            total_entries: paths.len(),
            total_size_bytes,
            partitions: PARTITION_COUNT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litekv_core::ManualClock;

    async fn store_in_tmp() -> (PartitionedStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = PartitionedStore::with_clock(dir.path(), Arc::new(ManualClock::new(1_000)));
        store.initialize().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn save_then_load_round_trips_the_value() {
        let (store, _dir) = store_in_tmp().await;
        store.save("a", Value::Str("hello".into())).await.unwrap();
        let loaded = store.load("a").await.unwrap().unwrap();
        assert_eq!(loaded.value, Value::Str("hello".into()));
        assert_eq!(loaded.metadata.version, 1);
    }

    #[tokio::test]
    async fn repeated_saves_increment_version() {
        let (store, _dir) = store_in_tmp().await;
        store.save("a", Value::Int(1)).await.unwrap();
        store.save("a", Value::Int(2)).await.unwrap();
        let entry = store.save("a", Value::Int(3)).await.unwrap();
        assert_eq!(entry.metadata.version, 3);
        assert_eq!(entry.value, Value::Int(3));
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let (store, _dir) = store_in_tmp().await;
        store.save("a", Value::Int(1)).await.unwrap();
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.load("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entries_land_in_a_stable_partition_directory() {
        let (store, dir) = store_in_tmp().await;
        store.save("partitioned-key", Value::Int(1)).await.unwrap();
        let partition = partition_of("partitioned-key");
        let expected_dir = dir.path().join(partition_dir_name(partition));
        let mut read_dir = tokio::fs::read_dir(&expected_dir).await.unwrap();
        let found = read_dir.next_entry().await.unwrap();
        assert!(found.is_some(), "expected file under {expected_dir:?}");
    }

    #[tokio::test]
    async fn clear_removes_every_entry() {
        let (store, _dir) = store_in_tmp().await;
        store.save("a", Value::Int(1)).await.unwrap();
        store.save("b", Value::Int(2)).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get_all_entries().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn list_reflects_every_saved_key() {
        let (store, _dir) = store_in_tmp().await;
        store.save("a", Value::Int(1)).await.unwrap();
        store.save("b", Value::Int(2)).await.unwrap();
        let mut keys = store.list().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
