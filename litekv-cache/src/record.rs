use litekv_core::Value;

/// A single cache entry as exposed to callers via `CacheEngine::get_entry`.
///
/// Always an owned snapshot, never a reference into the live table: a caller
/// that mutates its own copy cannot corrupt the engine's internal state.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    pub key: String,
    pub value: Value,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub last_accessed: i64,
    pub ttl_seconds: u64,
}

/// Internal table entry: the public record plus the bookkeeping the engine
/// needs to keep the record's spot in the LRU list in sync.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub record: CacheRecord,
    pub lru_index: usize,
}
