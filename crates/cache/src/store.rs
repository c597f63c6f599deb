use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fingerprint::{Clock, SystemClock};
use lru::LruCache;
use matcher::MatchResult;
use recommend::RecommendationScore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CacheError;
use crate::stats::{BYTES_PER_ENTRY, BYTES_PER_MATCH, BYTES_PER_RECOMMENDATION, CacheStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_capacity")]
    pub capacity: usize,
    #[serde(default = "CacheConfig::default_ttl_hours")]
    pub ttl_hours: i64,
}

impl CacheConfig {
    pub(crate) fn default_capacity() -> usize {
        100
    }

    pub(crate) fn default_ttl_hours() -> i64 {
        24
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ));
        }
        if self.ttl_hours <= 0 {
            return Err(CacheError::InvalidConfig(
                "ttl_hours must be greater than zero".into(),
            ));
        }
        self.ttl().map(|_| ())
    }

    /// Entry lifetime as a duration.
    pub fn ttl(&self) -> Result<Duration, CacheError> {
        Duration::try_hours(self.ttl_hours).ok_or_else(|| {
            CacheError::InvalidConfig(format!("ttl_hours {} is out of range", self.ttl_hours))
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
            ttl_hours: Self::default_ttl_hours(),
        }
    }
}

/// Cached results for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub matches: Vec<MatchResult>,
    pub recommendations: Vec<RecommendationScore>,
    pub created_at: DateTime<Utc>,
    /// Content hash of the fingerprint that produced `matches`.
    pub content_hash: u64,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}

enum Lookup {
    Missing,
    Expired,
    Stale { cached: u64 },
    Live,
}

/// Per-user LRU cache of matches and recommendations.
///
/// Entries expire `ttl` after they were written and are evicted lazily when
/// read. A lookup carrying a fingerprint hash also misses when the entry was
/// produced by a different fingerprint. Reads refresh recency, so every
/// method takes `&mut self`; see [`crate::SharedMatchCache`] for a
/// thread-safe handle.
pub struct MatchCache {
    entries: LruCache<Uuid, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MatchCache {
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self, CacheError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or_else(|| CacheError::InvalidConfig("capacity must be greater than zero".into()))?;
        Ok(Self {
            entries: LruCache::new(capacity),
            ttl: config.ttl()?,
            clock,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Whether an entry is stored for `user`, without touching recency or
    /// checking expiry.
    pub fn contains(&self, user: Uuid) -> bool {
        self.entries.contains(&user)
    }

    /// Cached matches for `user`.
    ///
    /// Misses when absent, expired or, when `current_hash` is given, produced
    /// by a different fingerprint. Expired and stale entries are evicted.
    pub fn get(&mut self, user: Uuid, current_hash: Option<u64>) -> Option<Vec<MatchResult>> {
        self.live(user, current_hash).map(|e| e.matches.clone())
    }

    pub fn get_recommendations(&mut self, user: Uuid) -> Option<Vec<RecommendationScore>> {
        self.live(user, None).map(|e| e.recommendations.clone())
    }

    /// Matches and recommendations of `user` read together, subject to the
    /// same expiry and hash checks as [`MatchCache::get`].
    pub fn get_entry(&mut self, user: Uuid, current_hash: Option<u64>) -> Option<CacheEntry> {
        self.live(user, current_hash).cloned()
    }

    /// Store results for `user`, replacing any previous entry. When the cache
    /// is full and `user` is new, the least recently used entry is evicted.
    pub fn set(
        &mut self,
        user: Uuid,
        matches: Vec<MatchResult>,
        recommendations: Vec<RecommendationScore>,
        content_hash: u64,
    ) {
        let entry = CacheEntry {
            matches,
            recommendations,
            created_at: self.clock.now(),
            content_hash,
        };
        if let Some((evicted, _)) = self.entries.push(user, entry) {
            if evicted != user {
                debug!(evicted = %evicted, "match_cache_evicted");
            }
        }
    }

    /// Replace only the recommendations of an existing entry. Matches, hash,
    /// timestamp and recency stay as they were. Returns whether an entry
    /// was updated.
    pub fn update_recommendations(
        &mut self,
        user: Uuid,
        recommendations: Vec<RecommendationScore>,
    ) -> bool {
        match self.entries.peek_mut(&user) {
            Some(entry) => {
                entry.recommendations = recommendations;
                true
            }
            None => false,
        }
    }

    pub fn invalidate(&mut self, user: Uuid) -> bool {
        self.entries.pop(&user).is_some()
    }

    /// Drop every expired entry and return how many were removed.
    pub fn clear_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<Uuid> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now, self.ttl))
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.entries.pop(id);
        }
        expired.len()
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut stats = CacheStats {
            total_entries: self.entries.len(),
            ..CacheStats::default()
        };
        let mut age_secs: i64 = 0;

        for (_, entry) in self.entries.iter() {
            stats.estimated_memory_bytes += entry.matches.len() * BYTES_PER_MATCH
                + entry.recommendations.len() * BYTES_PER_RECOMMENDATION
                + BYTES_PER_ENTRY;

            if entry.is_expired(now, self.ttl) {
                stats.expired_entries += 1;
                continue;
            }
            stats.valid_entries += 1;
            stats.total_matches += entry.matches.len();
            stats.total_recommendations += entry.recommendations.len();
            age_secs += entry.age(now).num_seconds();
        }

        if stats.valid_entries > 0 {
            stats.average_age_secs = age_secs / stats.valid_entries as i64;
        }
        stats
    }

    fn live(&mut self, user: Uuid, current_hash: Option<u64>) -> Option<&CacheEntry> {
        let now = self.clock.now();
        let lookup = match self.entries.peek(&user) {
            None => Lookup::Missing,
            Some(e) if e.is_expired(now, self.ttl) => Lookup::Expired,
            Some(e) => match current_hash {
                Some(hash) if hash != e.content_hash => Lookup::Stale {
                    cached: e.content_hash,
                },
                _ => Lookup::Live,
            },
        };

        match lookup {
            Lookup::Missing => None,
            Lookup::Expired => {
                debug!(user = %user, "match_cache_expired");
                self.entries.pop(&user);
                None
            }
            Lookup::Stale { cached } => {
                warn!(user = %user, cached, current = ?current_hash, "match_cache_stale_hash");
                self.entries.pop(&user);
                None
            }
            Lookup::Live => self.entries.get(&user),
        }
    }
}
