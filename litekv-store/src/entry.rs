use litekv_core::Value;
use serde::{Deserialize, Serialize};

/// On-disk metadata accompanying a [`StorageEntry`]'s value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub created_at: i64,
    pub updated_at: i64,
    /// Generation counter, bumped on every `save` of an existing key and
    /// reset to `1` by `compact`.
    pub version: u64,
}

/// A single persisted key, exactly as it is written to its partition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEntry {
    pub key: String,
    pub value: Value,
    pub metadata: EntryMetadata,
}

/// Aggregate health statistics for a [`crate::PartitionedStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
    pub partitions: usize,
}
