use std::path::PathBuf;
use std::time::Duration;

use litekv_core::MAX_STORE_VALUE_BYTES;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration for the `cache-server` binary. Loaded entirely from
/// environment variables with hard-coded defaults — there is no config
/// file tier in this system.
#[derive(Debug, Clone)]
pub struct CacheServerConfig {
    pub port: u16,
    /// Base URL of the store server, e.g. `http://127.0.0.1:8081`. `None`
    /// means this cache instance runs without write-through/fallback
    /// persistence at all.
    pub storage_service_url: Option<String>,
    pub max_cache_size: usize,
    pub default_ttl_seconds: u64,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
}

impl Default for CacheServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            storage_service_url: None,
            max_cache_size: 1000,
            default_ttl_seconds: 3600,
            rate_limit_max_requests: 100,
            rate_limit_window_ms: 60_000,
        }
    }
}

impl CacheServerConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            port: env_or("PORT", default.port),
            storage_service_url: std::env::var("STORAGE_SERVICE_URL").ok(),
            max_cache_size: env_or("MAX_CACHE_SIZE", default.max_cache_size),
            default_ttl_seconds: env_or("DEFAULT_TTL", default.default_ttl_seconds),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                default.rate_limit_max_requests,
            ),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", default.rate_limit_window_ms),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

/// Configuration for the `store-server` binary.
#[derive(Debug, Clone)]
pub struct StoreServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
    /// Seconds between automatic backups; `0` disables the background loop.
    pub backup_interval_seconds: u64,
    pub max_file_size: usize,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
}

impl Default for StoreServerConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            data_path: PathBuf::from("./data"),
            backup_interval_seconds: 300,
            max_file_size: MAX_STORE_VALUE_BYTES,
            rate_limit_max_requests: 100,
            rate_limit_window_ms: 60_000,
        }
    }
}

impl StoreServerConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            port: env_or("PORT", default.port),
            data_path: std::env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.data_path),
            // Documented as milliseconds (`BACKUP_INTERVAL=300000` = 5 minutes);
            // the field itself stays in seconds for `Duration::from_secs`.
            backup_interval_seconds: env_or("BACKUP_INTERVAL", default.backup_interval_seconds * 1000)
                / 1000,
            max_file_size: env_or("MAX_FILE_SIZE", default.max_file_size),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                default.rate_limit_max_requests,
            ),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", default.rate_limit_window_ms),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}
