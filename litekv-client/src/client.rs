use async_trait::async_trait;
use litekv_core::{Result, Value};
use litekv_store::StorageEntry;

/// The cache's view of the durable store: a network-capable (or, in tests,
/// in-process) client with an explicit kill switch.
///
/// When disabled, every data method fails immediately without performing
/// I/O — the contract `litekv-cache` needs to treat the store as an
/// untrusted, occasionally unreachable dependency rather than something it
/// must fail open or closed around on every call site.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Cheap liveness probe; should not be used as a substitute for
    /// handling failures from `save`/`load`/`delete` themselves.
    async fn available(&self) -> bool;

    async fn save(&self, key: &str, value: Value) -> Result<StorageEntry>;

    async fn load(&self, key: &str) -> Result<Option<StorageEntry>>;

    async fn delete(&self, key: &str) -> Result<bool>;

    fn enable(&self);

    fn disable(&self);

    fn is_enabled(&self) -> bool;
}
