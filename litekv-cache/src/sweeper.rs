use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::engine::CacheEngine;

/// Default interval between background expiry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to a running background sweeper, returned by [`spawn_sweeper`].
///
/// Mirrors the reference architecture's explicit `start()`/`stop()`
/// lifecycle methods (`IntelligentCacheSystem::start/stop`): the sweeper is
/// not fire-and-forget, it is an owned, stoppable task.
pub struct SweepHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the sweeper to stop and waits for its current iteration to
    /// finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Spawns a task that periodically calls [`CacheEngine::sweep_expired`].
///
/// This exists purely to bound the staleness of entries nobody reads; lazy
/// expiry on `get`/`get_entry` already guarantees no expired value is ever
/// returned to a caller.
pub fn spawn_sweeper(engine: Arc<Mutex<CacheEngine>>, interval: Duration) -> SweepHandle {
    let cancel = CancellationToken::new();
    let cancel_child = cancel.clone();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; skip it.
        loop {
            tokio::select! {
                _ = cancel_child.cancelled() => {
                    info!("cache sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let mut guard = engine.lock().await;
                    guard.sweep_expired();
                }
            }
        }
    });
    SweepHandle { cancel, task }
}
