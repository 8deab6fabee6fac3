//! TTL-bounded LRU storage for composed feed pages.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use tracing::{debug, warn};

use crate::application::pagination::FeedPage;
use crate::domain::entities::PostRecord;

use super::config::CacheConfig;
use super::keys::FeedCacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub const METRIC_FEED_CACHE_HIT: &str = "inkwell_feed_cache_hit_total";
pub const METRIC_FEED_CACHE_MISS: &str = "inkwell_feed_cache_miss_total";
pub const METRIC_FEED_CACHE_EXPIRED: &str = "inkwell_feed_cache_expired_total";
pub const METRIC_FEED_CACHE_STORE: &str = "inkwell_feed_cache_store_total";
pub const METRIC_FEED_CACHE_CLEAR: &str = "inkwell_feed_cache_clear_total";

struct Entry {
    page: FeedPage<PostRecord>,
    expires_at: Instant,
}

/// Shared cache of feed pages, injected into the feed service.
pub struct FeedCache {
    enabled: bool,
    ttl: Duration,
    entries: RwLock<LruCache<FeedCacheKey, Entry>>,
}

impl FeedCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            ttl: config.ttl(),
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached page unless it is missing or its TTL has elapsed.
    pub fn get(&self, key: &FeedCacheKey) -> Option<FeedPage<PostRecord>> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let lookup = entries
            .get(key)
            .map(|entry| (now < entry.expires_at).then(|| entry.page.clone()));
        let fresh = match lookup {
            Some(Some(page)) => Some(page),
            Some(None) => {
                entries.pop(key);
                counter!(METRIC_FEED_CACHE_EXPIRED).increment(1);
                None
            }
            None => None,
        };

        match fresh {
            Some(page) => {
                counter!(METRIC_FEED_CACHE_HIT).increment(1);
                debug!(
                    target: "inkwell::cache",
                    kind = key.kind.as_str(),
                    page = ?key.page,
                    "feed cache hit"
                );
                Some(page)
            }
            None => {
                counter!(METRIC_FEED_CACHE_MISS).increment(1);
                None
            }
        }
    }

    /// Stores a page for the configured TTL, evicting the least recently used
    /// entry when full.
    pub fn put(&self, key: FeedCacheKey, page: FeedPage<PostRecord>) {
        if !self.enabled {
            return;
        }

        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            warn!(
                target: "inkwell::cache",
                ttl_seconds = self.ttl.as_secs(),
                "feed cache ttl overflows the clock; page not stored"
            );
            return;
        };
        let entry = Entry { page, expires_at };
        rw_write(&self.entries, SOURCE, "put").put(key, entry);
        counter!(METRIC_FEED_CACHE_STORE).increment(1);
    }

    pub fn clear(&self) {
        let mut entries = rw_write(&self.entries, SOURCE, "clear");
        let dropped = entries.len();
        entries.clear();
        counter!(METRIC_FEED_CACHE_CLEAR).increment(1);
        debug!(target: "inkwell::cache", dropped, "feed cache cleared");
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
