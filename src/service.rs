//! Orchestration of the matching pipeline for one user at a time.
//!
//! [`TwinService::load_matches`] resolves a user's matches through three
//! levels:
//!
//! 1. the in-memory [`SharedMatchCache`], checked against the user's current
//!    fingerprint hash;
//! 2. unexpired [`pool::MatchRecord`]s persisted by an earlier run, whose
//!    recommendations are recomputed;
//! 3. a fresh scan of the eligible pool.
//!
//! Caches and records are written only after every computation of a run has
//! completed, so a dropped future leaves no partial state behind.

use std::sync::Arc;
use std::time::Instant;

use cache::{CacheError, CacheStats, SharedMatchCache};
use fingerprint::{
    Clock, ConsentLevel, Fingerprint, FingerprintError, SystemClock, UserProfile,
};
use matcher::{MatchError, MatchLevel, MatchResult, Matcher};
use pool::{history_snapshot, HistoryStore, PoolRepository, RepositoryError};
use recommend::{RecommendError, RecommendationEngine, RecommendationScore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::SkinTwinConfig;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("matching requires consent")]
    ConsentRequired,

    #[error("cannot build fingerprint: {0}")]
    InvalidFingerprint(#[from] FingerprintError),

    #[error("no eligible profiles in the pool")]
    EmptyPool,

    #[error("no profile is similar enough")]
    NoMatches,

    #[error("service unavailable: {0}")]
    ServiceUnavailable(#[from] RepositoryError),

    #[error("recommendation failed: {0}")]
    Recommendation(#[from] RecommendError),

    #[error("cache failure: {0}")]
    Cache(#[from] CacheError),

    #[error("matcher failure: {0}")]
    Match(#[from] MatchError),

    /// The blocking matcher task panicked or was cancelled.
    #[error("matcher worker failed: {0}")]
    Worker(String),
}

/// Where a [`TwinReport`] was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    MemoryCache,
    PersistedRecords,
    Fresh,
}

/// Summary figures over a set of matches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub average_similarity: f64,
    pub twin_count: usize,
    pub very_similar_count: usize,
    /// Effective products across all matches, duplicates included.
    pub total_effective_products: usize,
}

impl MatchStats {
    pub fn from_matches(matches: &[MatchResult]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }
        let count_level = |level| matches.iter().filter(|m| m.level == level).count();
        Self {
            average_similarity: matches.iter().map(|m| m.similarity).sum::<f64>()
                / matches.len() as f64,
            twin_count: count_level(MatchLevel::Twin),
            very_similar_count: count_level(MatchLevel::VerySimilar),
            total_effective_products: matches.iter().map(|m| m.effective_products.len()).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinReport {
    pub matches: Vec<MatchResult>,
    pub recommendations: Vec<RecommendationScore>,
    pub source: MatchSource,
    pub stats: MatchStats,
}

impl TwinReport {
    fn new(
        matches: Vec<MatchResult>,
        recommendations: Vec<RecommendationScore>,
        source: MatchSource,
    ) -> Self {
        let stats = MatchStats::from_matches(&matches);
        Self {
            matches,
            recommendations,
            source,
            stats,
        }
    }
}

/// Counts removed by [`TwinService::purge_expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeSummary {
    pub cache_entries: usize,
    pub match_records: usize,
}

/// Wires matcher, cache, recommendation engine and collaborators together.
pub struct TwinService {
    matcher: Arc<Matcher>,
    cache: SharedMatchCache,
    recommender: RecommendationEngine,
    pool: Arc<dyn PoolRepository>,
    history: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    candidate_limit: usize,
    match_limit: usize,
}

impl TwinService {
    pub fn new(
        config: &SkinTwinConfig,
        pool: Arc<dyn PoolRepository>,
        history: Arc<dyn HistoryStore>,
    ) -> Result<Self, ServiceError> {
        Self::with_clock(config, pool, history, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &SkinTwinConfig,
        pool: Arc<dyn PoolRepository>,
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        let matcher = Matcher::new(config.matcher.clone())?.with_clock(clock.clone());
        let cache = cache::MatchCache::with_clock(config.cache.clone(), clock.clone())?;
        let recommender = RecommendationEngine::new(config.recommend.clone(), history.clone())?;
        Ok(Self {
            matcher: Arc::new(matcher),
            cache: SharedMatchCache::new(cache),
            recommender,
            pool,
            history,
            clock,
            candidate_limit: config.pool.candidate_limit,
            match_limit: config.pool.match_limit,
        })
    }

    /// Handle to the memory cache, shared with this service.
    pub fn cache(&self) -> &SharedMatchCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> Result<CacheStats, ServiceError> {
        Ok(self.cache.stats()?)
    }

    /// Matches and recommendations for `profile`.
    ///
    /// `force_refresh` skips both cache levels and rescans the pool.
    #[instrument(skip(self, profile), fields(user = %profile.id))]
    pub async fn load_matches(
        &self,
        profile: &mut UserProfile,
        force_refresh: bool,
    ) -> Result<TwinReport, ServiceError> {
        if !profile.consent().allows_matching() {
            return Err(ServiceError::ConsentRequired);
        }

        let start = Instant::now();
        let fingerprint = self.fingerprint_for(profile).await?;
        let hash = fingerprint.content_hash();
        let user = profile.id;

        if !force_refresh {
            if let Some(report) = self.memory_hit(user, hash)? {
                debug!(matches = report.matches.len(), "load_matches_memory_hit");
                return Ok(report);
            }
            if let Some(report) = self.records_hit(user, hash, &fingerprint).await? {
                debug!(matches = report.matches.len(), "load_matches_records_hit");
                return Ok(report);
            }
        }

        let candidates = self
            .pool
            .fetch_eligible_profiles(user, self.candidate_limit)
            .await?;
        if candidates.is_empty() {
            return Err(ServiceError::EmptyPool);
        }
        let pool_size = candidates.len();

        let matcher = Arc::clone(&self.matcher);
        let query = fingerprint.clone();
        let limit = self.match_limit;
        let matches = tokio::task::spawn_blocking(move || {
            matcher.find_matches(&query, &candidates, limit)
        })
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))?;
        if matches.is_empty() {
            return Err(ServiceError::NoMatches);
        }

        let recommendations = self
            .recommender
            .rank_products_default(&fingerprint, &matches)
            .await?;

        self.pool.save_match_records(&matches, user, hash).await?;
        self.cache
            .set(user, matches.clone(), recommendations.clone(), hash)?;
        profile.last_matched_at = Some(self.clock.now());

        let elapsed_micros = start.elapsed().as_micros();
        info!(
            pool_size,
            matches = matches.len(),
            recommendations = recommendations.len(),
            elapsed_micros,
            "load_matches_success"
        );
        Ok(TwinReport::new(matches, recommendations, MatchSource::Fresh))
    }

    /// Recommendations built from a single twin's effective products.
    #[instrument(skip(self, profile, twin), fields(user = %profile.id, twin = %twin.candidate_id))]
    pub async fn select_twin(
        &self,
        profile: &mut UserProfile,
        twin: &MatchResult,
    ) -> Result<Vec<RecommendationScore>, ServiceError> {
        let fingerprint = self.fingerprint_for(profile).await?;
        Ok(self.recommender.products_from_twin(twin, &fingerprint).await?)
    }

    /// Re-rank recommendations for the cached matches of `profile`, keeping
    /// the cached matches and their age. Returns `None` when nothing usable
    /// is cached.
    #[instrument(skip(self, profile), fields(user = %profile.id))]
    pub async fn refresh_recommendations(
        &self,
        profile: &mut UserProfile,
    ) -> Result<Option<Vec<RecommendationScore>>, ServiceError> {
        let fingerprint = self.fingerprint_for(profile).await?;
        let user = profile.id;
        let Some(matches) = self.cache.get(user, Some(fingerprint.content_hash()))? else {
            return Ok(None);
        };

        let recommendations = self
            .recommender
            .rank_products_default(&fingerprint, &matches)
            .await?;
        if !self
            .cache
            .update_recommendations(user, recommendations.clone())?
        {
            // evicted while ranking
            return Ok(None);
        }
        Ok(Some(recommendations))
    }

    /// Apply a consent change. Withdrawing consent drops every cached and
    /// persisted match of the user; any other level triggers a forced
    /// reload.
    #[instrument(skip(self, profile), fields(user = %profile.id))]
    pub async fn update_consent(
        &self,
        profile: &mut UserProfile,
        level: ConsentLevel,
    ) -> Result<Option<TwinReport>, ServiceError> {
        profile.set_consent(level);
        if level.allows_matching() {
            return self.load_matches(profile, true).await.map(Some);
        }

        self.cache.invalidate(profile.id)?;
        self.pool.invalidate_match_records(profile.id).await?;
        info!("consent_withdrawn");
        Ok(None)
    }

    /// Drop expired cache entries and expired persisted records of all users.
    pub async fn purge_expired(&self) -> Result<PurgeSummary, ServiceError> {
        let cache_entries = self.cache.clear_expired()?;
        let match_records = self.pool.delete_expired_match_records(None).await?;
        debug!(cache_entries, match_records, "purge_expired_success");
        Ok(PurgeSummary {
            cache_entries,
            match_records,
        })
    }

    async fn fingerprint_for(&self, profile: &mut UserProfile) -> Result<Fingerprint, ServiceError> {
        let snapshot = match history_snapshot(self.history.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "history_snapshot_unavailable");
                return Err(err.into());
            }
        };
        Ok(profile.fingerprint(Some(&snapshot), self.clock.as_ref())?)
    }

    fn memory_hit(&self, user: Uuid, hash: u64) -> Result<Option<TwinReport>, ServiceError> {
        let Some(entry) = self.cache.get_entry(user, Some(hash))? else {
            return Ok(None);
        };
        Ok(Some(TwinReport::new(
            entry.matches,
            entry.recommendations,
            MatchSource::MemoryCache,
        )))
    }

    async fn records_hit(
        &self,
        user: Uuid,
        hash: u64,
        fingerprint: &Fingerprint,
    ) -> Result<Option<TwinReport>, ServiceError> {
        let records = self.pool.cached_match_records(user).await?;
        if records.is_empty() {
            return Ok(None);
        }
        if records.iter().any(|r| !r.matches_hash(hash)) {
            warn!(user = %user, current = hash, "match_records_stale_hash");
            self.pool.invalidate_match_records(user).await?;
            return Ok(None);
        }

        let mut matches: Vec<MatchResult> = records.into_iter().map(|r| r.into_match()).collect();
        matches.truncate(self.match_limit);
        let recommendations = self
            .recommender
            .rank_products_default(fingerprint, &matches)
            .await?;
        self.cache
            .set(user, matches.clone(), recommendations.clone(), hash)?;
        Ok(Some(TwinReport::new(
            matches,
            recommendations,
            MatchSource::PersistedRecords,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fingerprint::{AgeRange, AnonymousProfile, SkinType};

    fn result(level: MatchLevel, similarity: f64, products: usize) -> MatchResult {
        let product = fingerprint::Product::new("P", "B", fingerprint::ProductCategory::Serum);
        MatchResult {
            candidate_id: Uuid::new_v4(),
            similarity,
            level,
            profile: AnonymousProfile {
                skin_type: SkinType::Oily,
                age_range: AgeRange::Age25To30,
                main_concerns: vec![],
                issue_vector: vec![0.5; 7],
                region: None,
            },
            effective_products: (0..products)
                .map(|_| fingerprint::EffectiveProduct::new(product.clone(), 30, 0.5))
                .collect(),
            matched_at: Utc::now(),
        }
    }

    #[test]
    fn stats_over_matches() {
        let matches = vec![
            result(MatchLevel::Twin, 0.95, 2),
            result(MatchLevel::Twin, 0.9, 0),
            result(MatchLevel::VerySimilar, 0.85, 1),
            result(MatchLevel::Similar, 0.7, 3),
        ];
        let stats = MatchStats::from_matches(&matches);
        assert!((stats.average_similarity - 0.85).abs() < 1e-9);
        assert_eq!(stats.twin_count, 2);
        assert_eq!(stats.very_similar_count, 1);
        assert_eq!(stats.total_effective_products, 6);
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        assert_eq!(MatchStats::from_matches(&[]), MatchStats::default());
    }

    #[test]
    fn source_serializes_snake_case() {
        let json = serde_json::to_string(&MatchSource::PersistedRecords).unwrap();
        assert_eq!(json, "\"persisted_records\"");
    }
}
