use std::sync::Arc;

use litekv_core::{key::validate_key, ttl, Clock, Error, Result, SystemClock, Value, MAX_CACHE_VALUE_BYTES};
use litekv_table::HashTable;
use tracing::debug;

use crate::config::CacheConfig;
use crate::lru::LruList;
use crate::record::{CacheRecord, Entry};

/// Point-in-time health snapshot for a [`CacheEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Percentage of `get` calls that were hits, rounded to two decimals.
    pub hit_rate: f64,
    pub evictions: u64,
}

/// A bounded, TTL-aware, LRU-evicting in-memory cache.
///
/// Built on a [`litekv_table::HashTable`] for O(1) lookup and an
/// [`LruList`] for O(1) recency tracking; the two are kept in lockstep by
/// storing each entry's arena slot index alongside its record.
pub struct CacheEngine {
    table: HashTable<Entry>,
    lru: LruList,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheEngine {
    /// Builds an engine backed by the real system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds an engine backed by a caller-supplied clock, for deterministic
    /// TTL tests.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: HashTable::new(),
            lru: LruList::new(),
            config,
            clock,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn is_entry_expired(&self, entry: &Entry, now: i64) -> bool {
        ttl::is_expired(entry.record.expires_at, now)
    }

    /// Drops `key` from both the table and the LRU list.
    fn evict_key(&mut self, key: &str) {
        if let Some(entry) = self.table.remove(key) {
            self.lru.remove(entry.lru_index);
        }
    }

    /// Inserts or overwrites `key`. `ttl_seconds` of `None` falls back to
    /// `config.default_ttl_seconds`.
    ///
    /// If the cache is at `max_size` and `key` is new, the least recently
    /// used entry is evicted first.
    pub fn set(&mut self, key: &str, value: Value, ttl_seconds: Option<u64>) -> Result<()> {
        validate_key(key)?;
        let size = value.approximate_size();
        if size > MAX_CACHE_VALUE_BYTES {
            return Err(Error::ValidationFailure(format!(
                "value size {size} exceeds the {MAX_CACHE_VALUE_BYTES}-byte cache limit"
            )));
        }

        let now = self.clock.now_millis();
        let ttl_seconds = ttl_seconds.unwrap_or(self.config.default_ttl_seconds);
        let expires_at = ttl::expires_at(now, ttl_seconds);

        if let Some(existing) = self.table.get_mut(key) {
            existing.record.value = value;
            existing.record.created_at = now;
            existing.record.expires_at = expires_at;
            existing.record.last_accessed = now;
            existing.record.ttl_seconds = ttl_seconds;
            let idx = existing.lru_index;
            self.lru.move_to_front(idx);
            return Ok(());
        }

        if self.table.len() >= self.config.max_size {
            if let Some(evicted_key) = self.lru.pop_back() {
                self.table.delete(&evicted_key);
                self.evictions += 1;
                debug!(key = %evicted_key, "evicted LRU entry to make room");
            }
        }

        let lru_index = self.lru.insert_front(key.to_string());
        let record = CacheRecord {
            key: key.to_string(),
            value,
            created_at: now,
            expires_at,
            last_accessed: now,
            ttl_seconds,
        };
        self.table.set(key, Entry { record, lru_index });
        Ok(())
    }

    /// Returns the value for `key`, or `None` on a miss (including a lazily
    /// discovered expiry). Promotes the entry to most-recently-used on a hit.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();
        let expired = match self.table.get(key) {
            Some(entry) => self.is_entry_expired(entry, now),
            None => {
                self.misses += 1;
                return None;
            }
        };
        if expired {
            self.evict_key(key);
            self.misses += 1;
            return None;
        }
        let entry = self.table.get_mut(key).expect("checked present above");
        entry.record.last_accessed = now;
        let idx = entry.lru_index;
        let value = entry.record.value.clone();
        self.lru.move_to_front(idx);
        self.hits += 1;
        Some(value)
    }

    /// Returns an owned snapshot of `key`'s full record without mutating
    /// recency or access bookkeeping, or `None` if absent/expired.
    pub fn get_entry(&self, key: &str) -> Option<CacheRecord> {
        let now = self.clock.now_millis();
        let entry = self.table.get(key)?;
        if self.is_entry_expired(entry, now) {
            return None;
        }
        Some(entry.record.clone())
    }

    /// True if `key` is present and not expired. Does not affect recency.
    pub fn has(&self, key: &str) -> bool {
        self.get_entry(key).is_some()
    }

    /// Removes `key`. Returns whether anything was actually removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.table.remove(key) {
            Some(entry) => {
                self.lru.remove(entry.lru_index);
                true
            }
            None => false,
        }
    }

    /// Replaces `key`'s TTL without touching its value or recency. Returns
    /// `false` if the key is absent or already expired.
    pub fn update_ttl(&mut self, key: &str, ttl_seconds: u64) -> bool {
        let now = self.clock.now_millis();
        match self.table.get_mut(key) {
            Some(entry) if !ttl::is_expired(entry.record.expires_at, now) => {
                entry.record.ttl_seconds = ttl_seconds;
                entry.record.expires_at = ttl::expires_at(now, ttl_seconds);
                true
            }
            _ => false,
        }
    }

    /// Drops every entry and resets hit/miss/eviction counters to zero.
    pub fn clear(&mut self) {
        self.table.clear();
        self.lru = LruList::new();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    /// All live, non-expired keys, in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now_millis();
        self.table
            .entries()
            .into_iter()
            .filter(|(_, entry)| !self.is_entry_expired(entry, now))
            .map(|(k, _)| k)
            .collect()
    }

    /// Scans for and removes every currently expired entry, returning the
    /// count removed. Called by the background sweeper; safe to call
    /// directly from tests.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let expired_keys: Vec<String> = self
            .table
            .entries()
            .into_iter()
            .filter(|(_, entry)| self.is_entry_expired(entry, now))
            .map(|(k, _)| k)
            .collect();
        for key in &expired_keys {
            self.evict_key(key);
        }
        if !expired_keys.is_empty() {
            debug!(count = expired_keys.len(), "swept expired cache entries");
        }
        expired_keys.len()
    }

    pub fn get_stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            ((self.hits as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
        };
        CacheStats {
            size: self.table.len(),
            max_size: self.config.max_size,
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            evictions: self.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litekv_core::ManualClock;

    fn engine_with_clock(max_size: usize, default_ttl: u64) -> (CacheEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let engine = CacheEngine::with_clock(
            CacheConfig {
                max_size,
                default_ttl_seconds: default_ttl,
            },
            clock.clone(),
        );
        (engine, clock)
    }

    #[test]
    fn lru_eviction_with_access_promotion() {
        let (mut engine, _clock) = engine_with_clock(2, 0);
        engine.set("a", Value::Int(1), None).unwrap();
        engine.set("b", Value::Int(2), None).unwrap();
        // touch "a" so it becomes most recently used, leaving "b" as LRU.
        assert_eq!(engine.get("a"), Some(Value::Int(1)));
        engine.set("c", Value::Int(3), None).unwrap();
        assert_eq!(engine.get("b"), None, "b should have been evicted");
        assert_eq!(engine.get("a"), Some(Value::Int(1)));
        assert_eq!(engine.get("c"), Some(Value::Int(3)));
        assert_eq!(engine.get_stats().evictions, 1);
    }

    #[test]
    fn ttl_lazy_expiry_on_get() {
        let (mut engine, clock) = engine_with_clock(10, 0);
        engine.set("a", Value::Int(1), Some(1)).unwrap();
        assert_eq!(engine.get("a"), Some(Value::Int(1)));
        clock.advance(1_000);
        assert_eq!(engine.get("a"), None);
        assert_eq!(engine.get_stats().size, 0, "expired entry should be evicted on access");
    }

    #[test]
    fn zero_ttl_never_expires() {
        let (mut engine, clock) = engine_with_clock(10, 0);
        engine.set("a", Value::Int(1), None).unwrap();
        clock.advance(i64::MAX / 2);
        assert_eq!(engine.get("a"), Some(Value::Int(1)));
    }

    #[test]
    fn get_entry_does_not_mutate_recency() {
        let (mut engine, _clock) = engine_with_clock(2, 0);
        engine.set("a", Value::Int(1), None).unwrap();
        engine.set("b", Value::Int(2), None).unwrap();
        let _ = engine.get_entry("a");
        // "a" was only peeked, not `get`, so it is still the LRU victim.
        engine.set("c", Value::Int(3), None).unwrap();
        assert_eq!(engine.get("a"), None);
    }

    #[test]
    fn update_ttl_changes_expiry_without_touching_value() {
        let (mut engine, clock) = engine_with_clock(10, 0);
        engine.set("a", Value::Int(1), Some(1)).unwrap();
        assert!(engine.update_ttl("a", 100));
        clock.advance(1_500);
        assert_eq!(engine.get("a"), Some(Value::Int(1)));
    }

    #[test]
    fn stats_track_hits_misses_and_hit_rate() {
        let (mut engine, _clock) = engine_with_clock(10, 0);
        engine.set("a", Value::Int(1), None).unwrap();
        engine.get("a");
        engine.get("missing");
        let stats = engine.get_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 50.0);
    }

    #[test]
    fn rejects_oversized_values() {
        let (mut engine, _clock) = engine_with_clock(10, 0);
        let huge = Value::Str("x".repeat(MAX_CACHE_VALUE_BYTES + 1));
        assert!(engine.set("a", huge, None).is_err());
    }

    #[test]
    fn clear_empties_the_cache_and_resets_stats() {
        let (mut engine, _clock) = engine_with_clock(10, 0);
        engine.set("a", Value::Int(1), None).unwrap();
        engine.get("a");
        engine.clear();
        assert_eq!(engine.get_stats().size, 0);
        assert_eq!(engine.get_stats().hits, 0);
        assert_eq!(engine.get_stats().misses, 0);
        assert_eq!(engine.get_stats().evictions, 0);
    }

    #[test]
    fn sweep_expired_removes_stale_entries_without_being_read() {
        let (mut engine, clock) = engine_with_clock(10, 0);
        engine.set("a", Value::Int(1), Some(1)).unwrap();
        engine.set("b", Value::Int(2), None).unwrap();
        clock.advance(1_000);
        assert_eq!(engine.sweep_expired(), 1);
        assert_eq!(engine.get_stats().size, 1);
    }
}
