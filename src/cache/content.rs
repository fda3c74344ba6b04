//! Snapshot cache over the content store.
//!
//! Reads are served from an immutable [`ContentSnapshot`] until it is older
//! than the configured TTL. A refresh fans out one `page:<id>` and one
//! `metadata:<id>` fetch per catalog page and publishes the merged result in a
//! single step.
//!
//! At most one refresh runs per cache instance. The first caller to need a
//! refresh leads it and publishes its outcome on a watch channel; callers that
//! arrive while it is in flight follow that channel instead of fetching again.
//! Forced refreshes only follow a flight that started after they were called,
//! otherwise they wait for it to land and lead their own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::future::try_join_all;
use metrics::{counter, histogram};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::application::repos::ContentStore;

use super::catalog::PageCatalog;
use super::config::CacheConfig;
use super::keys::StoreKey;
use super::snapshot::{ContentSnapshot, PageContent, merge_sections};

pub(crate) const METRIC_CACHE_HIT_TOTAL: &str = "pagecopy_cache_hit_total";
pub(crate) const METRIC_CACHE_REFRESH_TOTAL: &str = "pagecopy_cache_refresh_total";
pub(crate) const METRIC_CACHE_REFRESH_COALESCED_TOTAL: &str =
    "pagecopy_cache_refresh_coalesced_total";
pub(crate) const METRIC_CACHE_REFRESH_MS: &str = "pagecopy_cache_refresh_ms";
pub(crate) const METRIC_CACHE_UNKNOWN_PAGE_TOTAL: &str = "pagecopy_cache_unknown_page_total";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("content store unavailable while reading `{key}`: {reason}")]
    StoreUnavailable { key: String, reason: String },
    #[error("content store did not answer `{key}` within {after:?}")]
    StoreTimeout { key: String, after: Duration },
}

type Outcome = Result<Arc<ContentSnapshot>, CacheError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshMode {
    Ttl,
    Forced,
}

impl RefreshMode {
    fn as_str(self) -> &'static str {
        match self {
            RefreshMode::Ttl => "ttl",
            RefreshMode::Forced => "forced",
        }
    }
}

struct Published {
    snapshot: Arc<ContentSnapshot>,
    /// `None` once invalidated: the snapshot is kept but never served as fresh.
    refreshed_at: Option<Instant>,
}

struct InFlight {
    generation: u64,
    done: watch::Receiver<Option<Outcome>>,
}

#[derive(Default)]
struct RefreshSlot {
    /// Number of refreshes started so far.
    generation: u64,
    in_flight: Option<InFlight>,
}

enum Claim {
    Fresh(Arc<ContentSnapshot>),
    Lead(u64, watch::Sender<Option<Outcome>>),
    Follow(watch::Receiver<Option<Outcome>>),
    Wait(watch::Receiver<Option<Outcome>>),
}

/// Clears the in-flight marker if the leading refresh is dropped mid-fetch.
struct FlightGuard<'a> {
    slot: &'a Mutex<RefreshSlot>,
    generation: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut slot = lock_slot(self.slot);
        if slot
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.generation == self.generation)
        {
            slot.in_flight = None;
        }
    }
}

/// Process-wide cache of every catalog page's sections.
///
/// Construct once per process and share it behind an `Arc`.
pub struct ContentCache {
    store: Arc<dyn ContentStore>,
    catalog: PageCatalog,
    config: CacheConfig,
    record: RwLock<Option<Published>>,
    slot: Mutex<RefreshSlot>,
}

impl ContentCache {
    pub fn new(store: Arc<dyn ContentStore>, catalog: PageCatalog, config: CacheConfig) -> Self {
        Self {
            store,
            catalog,
            config,
            record: RwLock::new(None),
            slot: Mutex::new(RefreshSlot::default()),
        }
    }

    pub fn catalog(&self) -> &PageCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The whole snapshot, refreshed first when missing or older than the TTL.
    pub async fn get_snapshot(&self) -> Result<Arc<ContentSnapshot>, CacheError> {
        if let Some(snapshot) = self.fresh_snapshot() {
            counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
            return Ok(snapshot);
        }

        self.refresh(RefreshMode::Ttl).await
    }

    /// Sections of one page.
    ///
    /// Ids outside the catalog, and pages the store holds nothing for, yield
    /// an empty map rather than an error.
    pub async fn get_page(&self, page_id: &str) -> Result<PageContent, CacheError> {
        let snapshot = self.get_snapshot().await?;

        match snapshot.page(page_id) {
            Some(content) => Ok(content.clone()),
            None => {
                debug!(page_id, "Unknown page requested; serving empty content");
                counter!(METRIC_CACHE_UNKNOWN_PAGE_TOTAL).increment(1);
                Ok(PageContent::new())
            }
        }
    }

    /// Drop the current snapshot and fetch a new one regardless of its age.
    ///
    /// Call after writing to the store: once this returns `Ok`, every read on
    /// this instance observes data at least as new as that write.
    pub async fn force_refresh(&self) -> Result<Arc<ContentSnapshot>, CacheError> {
        self.invalidate();
        self.refresh(RefreshMode::Forced).await
    }

    /// Mark the current snapshot stale; the next read refreshes.
    ///
    /// The snapshot itself stays available through [`last_known`](Self::last_known).
    pub fn invalidate(&self) {
        if let Some(published) = self.write_record().as_mut() {
            published.refreshed_at = None;
        }
    }

    /// The last published snapshot, whatever its age.
    ///
    /// Reads never fall back to this on their own; it exists for callers that
    /// explicitly choose to render stale copy after a failed refresh.
    pub fn last_known(&self) -> Option<Arc<ContentSnapshot>> {
        self.read_record()
            .as_ref()
            .map(|published| Arc::clone(&published.snapshot))
    }

    fn fresh_snapshot(&self) -> Option<Arc<ContentSnapshot>> {
        let ttl = self.config.ttl_non_zero();
        self.read_record()
            .as_ref()
            .filter(|published| {
                published
                    .refreshed_at
                    .is_some_and(|refreshed_at| refreshed_at.elapsed() <= ttl)
            })
            .map(|published| Arc::clone(&published.snapshot))
    }

    fn publish(&self, snapshot: Arc<ContentSnapshot>) {
        *self.write_record() = Some(Published {
            snapshot,
            refreshed_at: Some(Instant::now()),
        });
    }

    fn read_record(&self) -> RwLockReadGuard<'_, Option<Published>> {
        self.record.read().unwrap_or_else(|poisoned| {
            warn!(lock = "record", "Recovered poisoned snapshot record");
            poisoned.into_inner()
        })
    }

    fn write_record(&self) -> RwLockWriteGuard<'_, Option<Published>> {
        self.record.write().unwrap_or_else(|poisoned| {
            warn!(lock = "record", "Recovered poisoned snapshot record");
            poisoned.into_inner()
        })
    }

    async fn refresh(&self, mode: RefreshMode) -> Outcome {
        let requested = lock_slot(&self.slot).generation;

        loop {
            match self.claim(mode, requested) {
                Claim::Fresh(snapshot) => return Ok(snapshot),
                Claim::Lead(generation, done) => {
                    return self.lead_refresh(mode, generation, done).await;
                }
                Claim::Follow(done) => {
                    if let Some(outcome) = await_outcome(done).await {
                        counter!(METRIC_CACHE_REFRESH_COALESCED_TOTAL).increment(1);
                        debug!(mode = mode.as_str(), "Joined in-flight content refresh");
                        return outcome;
                    }
                }
                Claim::Wait(done) => {
                    let _ = await_outcome(done).await;
                }
            }
        }
    }

    fn claim(&self, mode: RefreshMode, requested: u64) -> Claim {
        let mut slot = lock_slot(&self.slot);

        if let Some(flight) = slot.in_flight.as_ref() {
            // A forced refresh must not reuse a fetch that began before it was asked for.
            return if mode == RefreshMode::Ttl || flight.generation > requested {
                Claim::Follow(flight.done.clone())
            } else {
                Claim::Wait(flight.done.clone())
            };
        }

        if mode == RefreshMode::Ttl {
            if let Some(snapshot) = self.fresh_snapshot() {
                return Claim::Fresh(snapshot);
            }
        }

        slot.generation += 1;
        let (sender, receiver) = watch::channel(None);
        slot.in_flight = Some(InFlight {
            generation: slot.generation,
            done: receiver,
        });
        Claim::Lead(slot.generation, sender)
    }

    #[instrument(skip(self, mode, done), fields(mode = mode.as_str()))]
    async fn lead_refresh(
        &self,
        mode: RefreshMode,
        generation: u64,
        done: watch::Sender<Option<Outcome>>,
    ) -> Outcome {
        let guard = FlightGuard {
            slot: &self.slot,
            generation,
        };
        let started_at = Instant::now();

        let outcome = self.fetch_snapshot().await.map(Arc::new);
        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(snapshot) => {
                self.publish(Arc::clone(snapshot));
                info!(
                    generation,
                    pages = snapshot.len(),
                    elapsed_ms,
                    "Content snapshot refreshed"
                );
            }
            Err(error) => {
                warn!(
                    generation,
                    error = %error,
                    elapsed_ms,
                    "Content snapshot refresh failed; keeping previous snapshot"
                );
            }
        }

        counter!(
            METRIC_CACHE_REFRESH_TOTAL,
            "mode" => mode.as_str(),
            "result" => if outcome.is_ok() { "ok" } else { "error" }
        )
        .increment(1);
        histogram!(METRIC_CACHE_REFRESH_MS, "mode" => mode.as_str()).record(elapsed_ms);

        drop(guard);
        done.send_replace(Some(outcome.clone()));
        outcome
    }

    async fn fetch_snapshot(&self) -> Result<ContentSnapshot, CacheError> {
        let pages = try_join_all(self.catalog.iter().map(|page_id| self.fetch_page(page_id)))
            .await?;
        Ok(ContentSnapshot::from_pages(pages))
    }

    async fn fetch_page(&self, page_id: &str) -> Result<(String, PageContent), CacheError> {
        let (content, metadata) = futures::try_join!(
            self.fetch_hash(StoreKey::content(page_id)),
            self.fetch_hash(StoreKey::metadata(page_id)),
        )?;
        Ok((page_id.to_string(), merge_sections(content, metadata)))
    }

    async fn fetch_hash(&self, key: StoreKey) -> Result<HashMap<String, String>, CacheError> {
        let key = key.render();
        let timeout = self.config.fetch_timeout_non_zero();

        match tokio::time::timeout(timeout, self.store.hash_get_all(&key)).await {
            Ok(Ok(fields)) => Ok(fields),
            Ok(Err(error)) => Err(CacheError::StoreUnavailable {
                key,
                reason: error.to_string(),
            }),
            Err(_) => Err(CacheError::StoreTimeout {
                key,
                after: timeout,
            }),
        }
    }
}

/// The slot only holds plain counters and receivers, so a poisoned lock is
/// still consistent.
fn lock_slot(slot: &Mutex<RefreshSlot>) -> MutexGuard<'_, RefreshSlot> {
    slot.lock().unwrap_or_else(|poisoned| {
        warn!(lock = "refresh_slot", "Recovered poisoned refresh slot");
        poisoned.into_inner()
    })
}

/// `None` when the leader was dropped before it finished.
async fn await_outcome(mut done: watch::Receiver<Option<Outcome>>) -> Option<Outcome> {
    match done.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    }
}
