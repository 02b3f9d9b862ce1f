//! # litekv-cache
//!
//! A bounded, in-memory key-value cache combining O(1) LRU recency tracking
//! ([`lru::LruList`]) with per-entry TTL expiry over a
//! [`litekv_table::HashTable`]. This is the "hot" half of the system; the
//! "durable" half lives in `litekv-store` and is reached only through a
//! `litekv-client::StorageClient`, never directly.

mod config;
mod engine;
mod lru;
mod record;
mod sweeper;

pub use config::CacheConfig;
pub use engine::{CacheEngine, CacheStats};
pub use record::CacheRecord;
pub use sweeper::{spawn_sweeper, SweepHandle, DEFAULT_SWEEP_INTERVAL};
