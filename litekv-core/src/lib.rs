//! # litekv-core
//!
//! Shared primitives for the `litekv` workspace: the djb2 hash used by both
//! the in-memory hash table and the on-disk partitioning scheme, key/value
//! validation, TTL arithmetic, the typed `Value` document tree, the error
//! enum every higher layer propagates, and a `Clock` abstraction so tests can
//! drive TTL expiry without real sleeps.
//!
//! Nothing in this crate talks to the network or the filesystem; it exists
//! so that `litekv-table`, `litekv-cache`, `litekv-store`, and `litekv-client`
//! agree on one definition of "what is a key", "what is a value", and "what
//! went wrong".

mod clock;
mod error;
pub mod envelope;
pub mod hash;
pub mod key;
pub mod ttl;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::Envelope;
pub use error::Error;
pub use value::Value;

/// Result alias used by every fallible operation in the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Inclusive bounds on key length, in bytes, per the data model.
pub const MIN_KEY_BYTES: usize = 1;
pub const MAX_KEY_BYTES: usize = 256;

/// Maximum serialized value size the cache will hold, in bytes.
pub const MAX_CACHE_VALUE_BYTES: usize = 1024 * 1024;

/// Maximum serialized value size the store will hold, in bytes.
pub const MAX_STORE_VALUE_BYTES: usize = 10 * 1024 * 1024;
