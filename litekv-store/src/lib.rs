//! # litekv-store
//!
//! The durable half of the system: a partitioned, single-file-per-key store
//! ([`PartitionedStore`]) plus the coordination layer in front of it
//! ([`StoreManager`]) that serializes writes through one FIFO queue, caches
//! recent reads, and takes periodic backups. The two live in one crate
//! because they are never deployed independently — `StoreManager` is a
//! thin layer the store owns, not a separate subsystem.

mod entry;
mod layout;
mod manager;
mod partitioned_store;
mod read_cache;

pub use entry::{EntryMetadata, StorageEntry, StoreStats};
pub use layout::{encode_filename, partition_of, PARTITION_COUNT};
pub use manager::{spawn_backup_loop, BackupHandle, StoreManager, StoreManagerConfig};
pub use partitioned_store::PartitionedStore;
