//! In-process page cache for composed feeds.
//!
//! Entries expire after a fixed TTL and are never invalidated on write; a new
//! post shows up in a cached page once the entry lapses or the cache is
//! cleared explicitly.
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 20
//! capacity = 64
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::FeedCacheKey;
pub use store::{
    FeedCache, METRIC_FEED_CACHE_CLEAR, METRIC_FEED_CACHE_EXPIRED, METRIC_FEED_CACHE_HIT,
    METRIC_FEED_CACHE_MISS, METRIC_FEED_CACHE_STORE,
};
