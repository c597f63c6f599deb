use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use fingerprint::{Fingerprint, Product};
use matcher::MatchResult;
use pool::HistoryStore;
use rayon::prelude::*;
use tracing::{debug, warn, Level};

use crate::config::RecommendConfig;
use crate::scoring::score_product;
use crate::types::{RecommendError, RecommendationScore};

/// Ranks the products that a user's matches found effective.
pub struct RecommendationEngine {
    config: RecommendConfig,
    history: Arc<dyn HistoryStore>,
}

impl RecommendationEngine {
    pub fn new(
        config: RecommendConfig,
        history: Arc<dyn HistoryStore>,
    ) -> Result<Self, RecommendError> {
        config.validate()?;
        Ok(Self { config, history })
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Score every product any match found effective and return the best
    /// `limit` at or above the admission floor.
    ///
    /// Ingredient stats are fetched once per call; products are scored in
    /// parallel.
    pub async fn rank_products(
        &self,
        user: &Fingerprint,
        matches: &[MatchResult],
        limit: usize,
    ) -> Result<Vec<RecommendationScore>, RecommendError> {
        let candidates = collect_candidates(matches);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let stats = match self.history.ingredient_effect_stats().await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(
                    error = %err,
                    candidates = candidates.len(),
                    "ingredient_stats_unavailable"
                );
                return Err(err.into());
            }
        };

        // no await while the span is entered
        let span = tracing::span!(
            Level::INFO,
            "recommend.rank_products",
            matches = matches.len(),
            candidates = candidates.len()
        );
        let _guard = span.enter();

        let mut scores: Vec<RecommendationScore> = candidates
            .par_iter()
            .filter_map(|product| score_product(product, user, matches, &stats, &self.config))
            .collect();
        scores.sort_by(by_score);
        scores.truncate(limit);

        let elapsed_micros = start.elapsed().as_micros();
        debug!(recommended = scores.len(), elapsed_micros, "rank_products_success");
        Ok(scores)
    }

    /// [`Self::rank_products`] with the configured default limit.
    pub async fn rank_products_default(
        &self,
        user: &Fingerprint,
        matches: &[MatchResult],
    ) -> Result<Vec<RecommendationScore>, RecommendError> {
        self.rank_products(user, matches, self.config.limit).await
    }

    /// Score only what `twin` found effective, against `twin` alone.
    pub async fn products_from_twin(
        &self,
        twin: &MatchResult,
        user: &Fingerprint,
    ) -> Result<Vec<RecommendationScore>, RecommendError> {
        if twin.effective_products.is_empty() {
            return Ok(Vec::new());
        }

        let stats = self.history.ingredient_effect_stats().await?;
        let only = std::slice::from_ref(twin);
        let mut scores: Vec<RecommendationScore> = twin
            .effective_products
            .iter()
            .filter_map(|e| score_product(&e.product, user, only, &stats, &self.config))
            .collect();
        scores.sort_by(by_score);

        debug!(twin = %twin.candidate_id, recommended = scores.len(), "products_from_twin");
        Ok(scores)
    }
}

/// Products any match used, deduplicated by id, first occurrence wins.
fn collect_candidates(matches: &[MatchResult]) -> Vec<Product> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .flat_map(|m| m.effective_products.iter())
        .filter(|e| seen.insert(e.product.id))
        .map(|e| e.product.clone())
        .collect()
}

/// Score descending, then product name, then id.
fn by_score(a: &RecommendationScore, b: &RecommendationScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.product.name.cmp(&b.product.name))
        .then_with(|| a.product.id.cmp(&b.product.id))
}
