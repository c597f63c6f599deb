use std::sync::{Arc, Mutex, MutexGuard};

use matcher::MatchResult;
use recommend::RecommendationScore;
use uuid::Uuid;

use crate::error::CacheError;
use crate::stats::CacheStats;
use crate::store::{CacheConfig, CacheEntry, MatchCache};

/// Cloneable, thread-safe handle to a [`MatchCache`].
///
/// Every operation holds the lock for its whole duration, so a read that
/// evicts an expired entry is never observed half-done.
#[derive(Clone)]
pub struct SharedMatchCache {
    inner: Arc<Mutex<MatchCache>>,
}

impl SharedMatchCache {
    pub fn new(cache: MatchCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn from_config(config: CacheConfig) -> Result<Self, CacheError> {
        MatchCache::new(config).map(Self::new)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MatchCache>, CacheError> {
        self.inner.lock().map_err(|_| CacheError::Poisoned)
    }

    pub fn get(
        &self,
        user: Uuid,
        current_hash: Option<u64>,
    ) -> Result<Option<Vec<MatchResult>>, CacheError> {
        Ok(self.lock()?.get(user, current_hash))
    }

    pub fn get_recommendations(
        &self,
        user: Uuid,
    ) -> Result<Option<Vec<RecommendationScore>>, CacheError> {
        Ok(self.lock()?.get_recommendations(user))
    }

    pub fn get_entry(
        &self,
        user: Uuid,
        current_hash: Option<u64>,
    ) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.lock()?.get_entry(user, current_hash))
    }

    pub fn set(
        &self,
        user: Uuid,
        matches: Vec<MatchResult>,
        recommendations: Vec<RecommendationScore>,
        content_hash: u64,
    ) -> Result<(), CacheError> {
        self.lock()?.set(user, matches, recommendations, content_hash);
        Ok(())
    }

    pub fn update_recommendations(
        &self,
        user: Uuid,
        recommendations: Vec<RecommendationScore>,
    ) -> Result<bool, CacheError> {
        Ok(self.lock()?.update_recommendations(user, recommendations))
    }

    pub fn invalidate(&self, user: Uuid) -> Result<bool, CacheError> {
        Ok(self.lock()?.invalidate(user))
    }

    pub fn clear_expired(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.clear_expired())
    }

    pub fn clear_all(&self) -> Result<(), CacheError> {
        self.lock()?.clear_all();
        Ok(())
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.lock()?.is_empty())
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        Ok(self.lock()?.stats())
    }
}
