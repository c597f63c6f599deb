//! # SkinTwin Cache (`cache`)
//!
//! Per-user in-memory cache of matches and recommendations.
//!
//! - Bounded LRU ([`lru`]): at most `capacity` users, the least recently
//!   read or written entry is evicted first.
//! - Entries expire `ttl_hours` after they were written; expiry is checked
//!   lazily on read and in bulk by [`MatchCache::clear_expired`].
//! - A lookup carrying the caller's current fingerprint hash misses when the
//!   entry was produced from a different fingerprint.
//!
//! [`SharedMatchCache`] wraps the cache behind a mutex for use across tasks.

pub mod error;
pub mod shared;
pub mod stats;
pub mod store;

pub use crate::error::CacheError;
pub use crate::shared::SharedMatchCache;
pub use crate::stats::{BYTES_PER_ENTRY, BYTES_PER_MATCH, BYTES_PER_RECOMMENDATION, CacheStats};
pub use crate::store::{CacheConfig, CacheEntry, MatchCache};
