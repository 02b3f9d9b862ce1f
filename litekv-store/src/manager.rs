use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use litekv_core::{Clock, Error, Result, SystemClock, Value};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::entry::StorageEntry;
use crate::partitioned_store::PartitionedStore;
use crate::read_cache::ReadCache;

/// Tuning knobs for a [`StoreManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreManagerConfig {
    pub read_cache_capacity: usize,
    /// Seconds between automatic backups. `0` disables the background
    /// backup loop entirely.
    pub backup_interval_seconds: u64,
    pub backup_dir: PathBuf,
}

impl Default for StoreManagerConfig {
    fn default() -> Self {
        Self {
            read_cache_capacity: 100,
            backup_interval_seconds: 300,
            backup_dir: PathBuf::from("backups"),
        }
    }
}

enum WriteJob {
    Save {
        key: String,
        value: Value,
        respond: oneshot::Sender<Result<StorageEntry>>,
    },
    Delete {
        key: String,
        respond: oneshot::Sender<Result<bool>>,
    },
}

/// Coordinates all access to a [`PartitionedStore`]: a single FIFO write
/// queue (so concurrent `save`/`delete` calls never interleave on disk), a
/// small bounded read cache, and periodic snapshot backups.
pub struct StoreManager {
    store: Arc<PartitionedStore>,
    write_tx: mpsc::UnboundedSender<WriteJob>,
    read_cache: Arc<Mutex<ReadCache>>,
    pending_writes: Arc<AtomicUsize>,
    backup_dir: PathBuf,
    clock: Arc<dyn Clock>,
    drainer: Mutex<Option<JoinHandle<()>>>,
}

impl StoreManager {
    pub fn new(store: Arc<PartitionedStore>, config: StoreManagerConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<PartitionedStore>,
        config: StoreManagerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let read_cache = Arc::new(Mutex::new(ReadCache::new(config.read_cache_capacity)));
        let pending_writes = Arc::new(AtomicUsize::new(0));
        let drainer = spawn_drainer(
            store.clone(),
            read_cache.clone(),
            pending_writes.clone(),
            write_rx,
        );
        Self {
            store,
            write_tx,
            read_cache,
            pending_writes,
            backup_dir: config.backup_dir,
            clock,
            drainer: Mutex::new(Some(drainer)),
        }
    }

    /// Enqueues a write and awaits its completion, in strict arrival order
    /// relative to every other `save`/`delete` on this manager.
    pub async fn save(&self, key: &str, value: Value) -> Result<StorageEntry> {
        let (respond, recv) = oneshot::channel();
        self.pending_writes.fetch_add(1, Ordering::SeqCst);
        let job = WriteJob::Save {
            key: key.to_string(),
            value,
            respond,
        };
        if self.write_tx.send(job).is_err() {
            self.pending_writes.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::Unavailable("store manager is shut down".into()));
        }
        recv.await
            .unwrap_or_else(|_| Err(Error::Unavailable("write was dropped before completing".into())))
    }

    /// Enqueues a delete and awaits its completion, ordered against `save`
    /// the same way `save` is ordered against other writes.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let (respond, recv) = oneshot::channel();
        self.pending_writes.fetch_add(1, Ordering::SeqCst);
        let job = WriteJob::Delete {
            key: key.to_string(),
            respond,
        };
        if self.write_tx.send(job).is_err() {
            self.pending_writes.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::Unavailable("store manager is shut down".into()));
        }
        recv.await
            .unwrap_or_else(|_| Err(Error::Unavailable("delete was dropped before completing".into())))
    }

    /// Reads `key`, consulting the read cache before falling back to disk.
    /// Reads are not ordered against pending writes.
    pub async fn read(&self, key: &str) -> Result<Option<StorageEntry>> {
        if let Some(entry) = self.read_cache.lock().await.get(key).cloned() {
            return Ok(Some(entry));
        }
        let loaded = self.store.load(key).await?;
        if let Some(entry) = &loaded {
            self.read_cache.lock().await.put(key.to_string(), entry.clone());
        }
        Ok(loaded)
    }

    /// Blocks until the write queue has fully drained.
    pub async fn flush(&self) {
        while self.pending_writes.load(Ordering::SeqCst) > 0 {
            sleep(Duration::from_millis(2)).await;
        }
    }

    /// Writes a point-in-time snapshot of every entry to `backup_dir`,
    /// returning the file path written.
    pub async fn backup_now(&self) -> Result<PathBuf> {
        let entries = self.store.get_all_entries().await?;
        tokio::fs::create_dir_all(&self.backup_dir).await?;
        let path = self
            .backup_dir
            .join(format!("backup_{}.json", self.clock.now_millis()));
        let pretty = serde_json::to_string_pretty(&entries)?;
        tokio::fs::write(&path, pretty).await?;
        info!(path = %path.display(), count = entries.len(), "wrote store backup");
        Ok(path)
    }

    /// Replays every entry in a backup file through `save`. Versions are
    /// not preserved: each replayed key gets a fresh version counter
    /// starting from whatever is already on disk for that key.
    pub async fn restore(&self, path: &Path) -> Result<usize> {
        let bytes = tokio::fs::read(path).await?;
        let entries: Vec<StorageEntry> = serde_json::from_slice(&bytes)?;
        let count = entries.len();
        for entry in entries {
            self.save(&entry.key, entry.value).await?;
        }
        Ok(count)
    }

    /// Renumbers every key's version counter back to `1`: snapshots every
    /// entry, clears the store and the read cache, then re-saves each
    /// entry's latest value.
    pub async fn compact(&self) -> Result<usize> {
        let entries = self.store.get_all_entries().await?;
        self.store.clear().await?;
        self.read_cache.lock().await.clear();
        for entry in &entries {
            self.store.save(&entry.key, entry.value.clone()).await?;
        }
        debug!(count = entries.len(), "compacted store, versions renumbered to 1");
        Ok(entries.len())
    }

    /// Stops accepting new work cleanly: flushes the write queue and makes
    /// one best-effort final backup attempt.
    pub async fn shutdown(&self) {
        self.flush().await;
        if let Err(err) = self.backup_now().await {
            warn!(error = %err, "final shutdown backup failed");
        }
        if let Some(handle) = self.drainer.lock().await.take() {
            handle.abort();
        }
    }

    pub fn store(&self) -> &Arc<PartitionedStore> {
        &self.store
    }
}

fn spawn_drainer(
    store: Arc<PartitionedStore>,
    read_cache: Arc<Mutex<ReadCache>>,
    pending_writes: Arc<AtomicUsize>,
    mut write_rx: mpsc::UnboundedReceiver<WriteJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = write_rx.recv().await {
            match job {
                WriteJob::Save { key, value, respond } => {
                    let result = store.save(&key, value).await;
                    if let Ok(entry) = &result {
                        read_cache.lock().await.put(key, entry.clone());
                    }
                    let _ = respond.send(result);
                }
                WriteJob::Delete { key, respond } => {
                    let result = store.delete(&key).await;
                    read_cache.lock().await.remove(&key);
                    let _ = respond.send(result);
                }
            }
            pending_writes.fetch_sub(1, Ordering::SeqCst);
        }
    })
}

/// Handle to a running background backup loop, returned by
/// [`spawn_backup_loop`].
pub struct BackupHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl BackupHandle {
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Spawns a task that calls [`StoreManager::backup_now`] on a fixed
/// interval. The caller is responsible for checking
/// `config.backup_interval_seconds != 0` before calling this — an interval
/// of zero means "no background backups", not "a zero-length timer".
pub fn spawn_backup_loop(manager: Arc<StoreManager>, interval: Duration) -> BackupHandle {
    let cancel = CancellationToken::new();
    let cancel_child = cancel.clone();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel_child.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = manager.backup_now().await {
                        warn!(error = %err, "periodic backup failed");
                    }
                }
            }
        }
    });
    BackupHandle { cancel, task }
}
