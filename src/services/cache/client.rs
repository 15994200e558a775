//! Cache client interface used by the module data-access libraries.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Note:
/// - We keep this independent from `ApiError`; the module libraries wrap it
///   into `ModuleError` and the handlers decide the HTTP status.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal, string-based cache interface.
///
/// Records are stored as JSON strings, campaign pages as lists of randids.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside)
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Round-trip check used at cold start.
    async fn ping(&self) -> CacheResult<()>;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Unconditionally set a value with TTL.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Delete keys. Returns number of deleted keys.
    async fn del_many(&self, keys: &[String]) -> CacheResult<u64>;

    // In one atomic step: keep only the first `retained` list entries
    // (`0` empties the list), append `values`, refresh the TTL.
    // Returns the list length afterwards.
    async fn list_replace_tail(
        &self,
        key: &str,
        retained: u64,
        values: &[String],
        ttl: Duration,
    ) -> CacheResult<u64>;
}

/// Convenience helper to build a TTL from seconds.
pub fn ttl_seconds(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
