//! Page copy cache.
//!
//! Holds one immutable snapshot of every catalog page's sections, merged from
//! the store's `page:<id>` and `metadata:<id>` hashes:
//!
//! - **TTL reads**: served from the snapshot until it is older than the TTL
//! - **Forced refresh**: invoked after writes for read-your-writes
//! - **Single flight**: concurrent refresh attempts collapse into one fan-out
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `pagecopy.toml`:
//!
//! ```toml
//! [cache]
//! ttl_seconds = 60
//!
//! [store]
//! fetch_timeout_ms = 5000
//!
//! [content]
//! pages = ["home", "about", "contact"]
//! ```

mod catalog;
mod config;
mod content;
mod keys;
mod snapshot;

pub use catalog::{DEFAULT_PAGES, PageCatalog};
pub use config::CacheConfig;
pub(crate) use config::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_TTL_SECS};
pub use content::{CacheError, ContentCache};
pub(crate) use content::{
    METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_REFRESH_COALESCED_TOTAL, METRIC_CACHE_REFRESH_MS,
    METRIC_CACHE_REFRESH_TOTAL, METRIC_CACHE_UNKNOWN_PAGE_TOTAL,
};
pub use keys::{SectionKind, StoreKey};
pub use snapshot::{ContentSnapshot, PageContent, merge_sections};
