use thiserror::Error;

/// Unified error type for the `litekv` core and its adapters.
///
/// Mirrors the error kinds named in the system's error handling design:
/// validation failures and not-found are boundary-facing (map to 4xx),
/// `IoFailure`/`CorruptEntry` are store-side failures, `Unavailable` is the
/// storage client's view of a timed-out or unreachable store, and
/// `RateLimited` exists only for the HTTP boundary to construct.
#[derive(Error, Debug)]
pub enum Error {
    /// Key empty/too long, value too large, or a negative ttl.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    /// The requested key is absent (including lazily-expired cache entries).
    #[error("key not found")]
    NotFound,

    /// A file read/write failed for a reason other than "file does not
    /// exist".
    #[error("io failure: {0}")]
    IoFailure(#[from] std::io::Error),

    /// A store file's JSON contents failed to parse.
    #[error("corrupt entry: {0}")]
    CorruptEntry(String),

    /// The storage client could not reach the store (timeout, connection
    /// refused, or the client's kill switch is disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Boundary-only: the caller exceeded their request quota.
    #[error("rate limited")]
    RateLimited,

    /// Catch-all for serialization failures that do not fit another variant.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for errors that should be treated as a cache miss rather than a
    /// hard failure, per the propagation policy: "`CacheEngine` translates
    /// store-client failures to a miss on reads".
    pub fn is_miss_equivalent(&self) -> bool {
        matches!(self, Error::NotFound | Error::Unavailable(_))
    }
}
