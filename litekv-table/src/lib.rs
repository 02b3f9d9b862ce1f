//! # litekv-table
//!
//! A hand-rolled chained hash table keyed by `String`, with load-factor
//! triggered rehashing. This is the foundation `litekv-cache::CacheEngine`
//! builds its TTL+LRU cache on top of.
//!
//! Chaining (rather than open addressing) was chosen because it keeps
//! deletion trivial (unlink one node; no tombstones) and because the
//! rehash-at-0.75-load-factor policy keeps expected chain length under
//! ~1.3 at steady state, which is plenty for the tiny working sets this
//! system targets.

use litekv_core::hash::bucket_index;

const INITIAL_CAPACITY: usize = 16;
const LOAD_FACTOR_THRESHOLD: f64 = 0.75;

struct Node<V> {
    key: String,
    value: V,
    next: Option<Box<Node<V>>>,
}

/// Aggregate health statistics for a `HashTable`, as surfaced by
/// `get_stats()`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    pub size: usize,
    pub capacity: usize,
    pub load_factor: f64,
    pub used_buckets: usize,
    pub max_chain_length: usize,
    pub avg_chain_length: f64,
}

/// A chained hash table with automatic doubling rehash.
///
/// All operations are amortized O(1) expected, per the bucket hash
/// distribution of [`litekv_core::hash::djb2`].
pub struct HashTable<V> {
    buckets: Vec<Option<Box<Node<V>>>>,
    size: usize,
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with the default initial capacity (16).
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an empty table with a caller-chosen initial capacity. Mostly
    /// useful for tests that want to observe a specific rehash boundary.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buckets: (0..capacity).map(|_| None).collect(),
            size: 0,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current number of buckets. Doubles whenever the load factor crosses
    /// 0.75 on a new insertion.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn index_of(&self, key: &str) -> usize {
        bucket_index(key, self.buckets.len())
    }

    /// Inserts a new key or overwrites an existing one.
    ///
    /// Returns `true` if `key` was not previously present (a genuinely new
    /// insertion), `false` if an existing entry's value was overwritten. A
    /// new insertion that pushes the load factor to 0.75 or above triggers
    /// an immediate rehash to double the bucket count.
    pub fn set(&mut self, key: &str, value: V) -> bool {
        let idx = self.index_of(key);
        {
            let mut cursor = self.buckets[idx].as_mut();
            while let Some(node) = cursor {
                if node.key == key {
                    node.value = value;
                    return false;
                }
                cursor = node.next.as_mut();
            }
        }
        let new_node = Box::new(Node {
            key: key.to_string(),
            value,
            next: self.buckets[idx].take(),
        });
        self.buckets[idx] = Some(new_node);
        self.size += 1;
        if self.load_factor() >= LOAD_FACTOR_THRESHOLD {
            self.rehash();
        }
        true
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&V> {
        let idx = self.index_of(key);
        let mut cursor = self.buckets[idx].as_deref();
        while let Some(node) = cursor {
            if node.key == key {
                return Some(&node.value);
            }
            cursor = node.next.as_deref();
        }
        None
    }

    /// Returns a mutable reference to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.index_of(key);
        let mut cursor = self.buckets[idx].as_deref_mut();
        while let Some(node) = cursor {
            if node.key == key {
                return Some(&mut node.value);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index_of(key);
        let mut cursor = &mut self.buckets[idx];
        loop {
            match cursor {
                Some(node) if node.key == key => {
                    let mut owned = cursor.take().expect("checked Some above");
                    *cursor = owned.next.take();
                    self.size -= 1;
                    return Some(owned.value);
                }
                Some(node) => {
                    cursor = &mut node.next;
                }
                None => return None,
            }
        }
    }

    /// Removes `key`, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    /// Resets the table to an empty state at the initial capacity.
    pub fn clear(&mut self) {
        self.buckets = (0..INITIAL_CAPACITY).map(|_| None).collect();
        self.size = 0;
    }

    /// All live keys, in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    /// All live values, in unspecified order.
    pub fn values(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.size);
        for bucket in &self.buckets {
            let mut cursor = bucket.as_deref();
            while let Some(node) = cursor {
                out.push(&node.value);
                cursor = node.next.as_deref();
            }
        }
        out
    }

    /// All live `(key, value)` pairs, in unspecified order.
    pub fn entries(&self) -> Vec<(String, &V)> {
        let mut out = Vec::with_capacity(self.size);
        for bucket in &self.buckets {
            let mut cursor = bucket.as_deref();
            while let Some(node) = cursor {
                out.push((node.key.clone(), &node.value));
                cursor = node.next.as_deref();
            }
        }
        out
    }

    fn load_factor(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// Doubles the bucket count and reinserts every existing node. Node
    /// order within the new chains is unspecified but deterministic for a
    /// given hash function and insertion history.
    fn rehash(&mut self) {
        let new_capacity = self.buckets.len() * 2;
        let old_buckets = std::mem::replace(
            &mut self.buckets,
            (0..new_capacity).map(|_| None).collect(),
        );
        for mut chain in old_buckets {
            while let Some(mut node) = chain {
                chain = node.next.take();
                let idx = bucket_index(&node.key, new_capacity);
                node.next = self.buckets[idx].take();
                self.buckets[idx] = Some(node);
            }
        }
    }

    /// Snapshot of table health for admin/debug surfaces.
    pub fn get_stats(&self) -> TableStats {
        let capacity = self.buckets.len();
        let mut used_buckets = 0usize;
        let mut max_chain_length = 0usize;
        let mut total_chain_length = 0usize;
        for bucket in &self.buckets {
            let mut len = 0usize;
            let mut cursor = bucket.as_deref();
            while let Some(node) = cursor {
                len += 1;
                cursor = node.next.as_deref();
            }
            if len > 0 {
                used_buckets += 1;
                total_chain_length += len;
                max_chain_length = max_chain_length.max(len);
            }
        }
        let avg_chain_length = if used_buckets == 0 {
            0.0
        } else {
            total_chain_length as f64 / used_buckets as f64
        };
        TableStats {
            size: self.size,
            capacity,
            load_factor: self.size as f64 / capacity as f64,
            used_buckets,
            max_chain_length,
            avg_chain_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_new_vs_overwrite() {
        let mut table = HashTable::new();
        assert!(table.set("a", 1));
        assert!(!table.set("a", 2));
        assert_eq!(table.get("a"), Some(&2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn delete_unlinks_and_shrinks_size() {
        let mut table = HashTable::new();
        table.set("a", 1);
        table.set("b", 2);
        assert!(table.delete("a"));
        assert!(!table.delete("a"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a"), None);
        assert_eq!(table.get("b"), Some(&2));
    }

    #[test]
    fn clear_resets_to_initial_capacity() {
        let mut table = HashTable::new();
        for i in 0..30 {
            table.set(&format!("k{i}"), i);
        }
        assert!(table.capacity() > INITIAL_CAPACITY);
        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), INITIAL_CAPACITY);
    }

    #[test]
    fn rehash_preserves_all_entries() {
        // Scenario: start at capacity 16, insert key0..key20 (21 keys).
        let mut table = HashTable::with_capacity(16);
        for i in 0..=20 {
            table.set(&format!("key{i}"), format!("v{i}"));
        }
        let stats = table.get_stats();
        assert_eq!(stats.capacity, 32);
        assert_eq!(stats.size, 21);
        for i in 0..=20 {
            assert_eq!(table.get(&format!("key{i}")), Some(&format!("v{i}")));
        }
    }

    #[test]
    fn stats_on_empty_table_has_zero_avg_chain_length() {
        let table: HashTable<i32> = HashTable::new();
        let stats = table.get_stats();
        assert_eq!(stats.avg_chain_length, 0.0);
        assert_eq!(stats.used_buckets, 0);
    }

    #[test]
    fn keys_values_entries_cover_all_live_data() {
        let mut table = HashTable::new();
        table.set("a", 1);
        table.set("b", 2);
        table.set("c", 3);
        let mut keys = table.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(table.values().len(), 3);
        assert_eq!(table.entries().len(), 3);
    }
}
