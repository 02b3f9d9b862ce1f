//! On-disk layout: partition selection and filename encoding.
//!
//! Both are compatibility-critical — a store instance that used a different
//! hash or a different filename scheme could no longer find files it wrote
//! in a previous run.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use litekv_core::hash::bucket_index;

/// Number of on-disk partitions. Fixed, not configurable: changing it would
/// silently orphan every file already written under the old scheme.
pub const PARTITION_COUNT: usize = 16;

/// Selects the partition index for `key`, via `djb2(key) mod 16`.
pub fn partition_of(key: &str) -> usize {
    bucket_index(key, PARTITION_COUNT)
}

/// Encodes `key` into a filesystem-safe filename: standard base64 of the raw
/// key bytes with `/`, `+`, and `=` all replaced by `_`.
pub fn encode_filename(key: &str) -> String {
    STANDARD
        .encode(key.as_bytes())
        .replace(['/', '+', '='], "_")
}

pub fn partition_dir_name(partition: usize) -> String {
    format!("partition_{partition}")
}
