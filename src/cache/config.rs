//! Content cache configuration.
//!
//! Controls snapshot freshness and the per-fetch timeout via `pagecopy.toml`.

use std::time::Duration;

// Default values for cache configuration
pub(crate) const DEFAULT_TTL_SECS: u64 = 60;
pub(crate) const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

/// Tuning knobs for [`ContentCache`](super::ContentCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum snapshot age before the next read refreshes it.
    pub ttl: Duration,
    /// Upper bound for each hash fetch during a refresh.
    pub fetch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::Settings> for CacheConfig {
    fn from(settings: &crate::config::Settings) -> Self {
        Self {
            ttl: settings.cache.ttl,
            fetch_timeout: settings.store.fetch_timeout,
        }
    }
}

impl CacheConfig {
    /// Returns the TTL clamped to at least one millisecond.
    pub fn ttl_non_zero(&self) -> Duration {
        self.ttl.max(Duration::from_millis(1))
    }

    /// Returns the fetch timeout clamped to at least one millisecond.
    pub fn fetch_timeout_non_zero(&self) -> Duration {
        self.fetch_timeout.max(Duration::from_millis(1))
    }
}
