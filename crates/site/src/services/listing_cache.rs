//! Rendered moderation listing cache.
//!
//! Holds the HTML of `/admin/submissions` per filter. Every successful
//! moderation write clears the whole cache so the next view re-reads the
//! store.
//!
//! A render that read the store before an invalidation must not be stored
//! after it. Readers take a [`Generation`] before querying the store and
//! insert with it; inserts from an older generation are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use crate::db::ListingQuery;

/// Upper bound on distinct cached filters (one per status plus "all").
const MAX_ENTRIES: u64 = 64;

/// Invalidation epoch observed before reading the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Cache of rendered listing pages keyed by filter.
#[derive(Clone)]
pub struct ListingCache {
    pages: Cache<(u64, ListingQuery), Arc<str>>,
    generation: Arc<AtomicU64>,
}

impl ListingCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self {
            pages,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current generation. Take it before reading the store.
    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::Acquire))
    }

    /// Cached page for a filter, if still fresh.
    pub async fn get(&self, query: &ListingQuery) -> Option<Arc<str>> {
        let key = (self.generation.load(Ordering::Acquire), query.clone());
        self.pages.get(&key).await
    }

    /// Store a page rendered from a store read made at `generation`.
    ///
    /// Returns `false` and stores nothing when the cache has been
    /// invalidated since.
    pub async fn insert(&self, generation: Generation, query: ListingQuery, html: Arc<str>) -> bool {
        if self.generation() != generation {
            tracing::debug!("Discarding listing rendered before the last invalidation");
            return false;
        }
        self.pages.insert((generation.0, query), html).await;
        true
    }

    /// Drop every cached page.
    ///
    /// Entries present before the call are never returned afterwards, and
    /// renders that started before it are not stored.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.pages.invalidate_all();
        tracing::debug!("Invalidated moderation listing cache");
    }
}
