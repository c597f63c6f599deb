use std::sync::{Arc, OnceLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use fingerprint::{cosine_similarity, CandidateProfile, Clock, Fingerprint, SystemClock};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn, Level};

use crate::types::{BatchConfig, MatchError, MatchLevel, MatchResult};

#[cfg(test)]
mod tests;

const SKIN_TYPE_MATCH_BONUS: f64 = 0.2;
const SKIN_TYPE_MISMATCH_PENALTY: f64 = 0.3;
const AGE_CLOSE_THRESHOLD: f64 = 0.2;
const AGE_FAR_THRESHOLD: f64 = 0.4;
const AGE_ADJUSTMENT: f64 = 0.1;
const CONCERN_OVERLAP_BONUS: f64 = 0.03;
const SENSITIVITY_THRESHOLD: f64 = 0.2;
const SENSITIVITY_BONUS: f64 = 0.05;

/// Weighted similarity of two fingerprints in [0, 1].
///
/// Cosine similarity of the feature vectors plus categorical adjustments for
/// skin type, age, shared concerns and irritation history. Fingerprints whose
/// vectors differ in length are malformed and score exactly 0.
pub fn weighted_similarity(query: &Fingerprint, candidate: &Fingerprint) -> f64 {
    if query.dimensions() != candidate.dimensions() {
        return 0.0;
    }
    let base = cosine_similarity(&query.vector(), &candidate.vector());
    adjust(base, query, candidate)
}

fn adjust(base: f64, query: &Fingerprint, candidate: &Fingerprint) -> f64 {
    let mut score = base;

    if query.skin_type == candidate.skin_type {
        score += SKIN_TYPE_MATCH_BONUS;
    } else {
        score -= SKIN_TYPE_MISMATCH_PENALTY;
    }

    let age_diff = (query.age_range.normalized() - candidate.age_range.normalized()).abs();
    if age_diff < AGE_CLOSE_THRESHOLD {
        score += AGE_ADJUSTMENT;
    } else if age_diff > AGE_FAR_THRESHOLD {
        score -= AGE_ADJUSTMENT;
    }

    let shared = query
        .concerns
        .iter()
        .filter(|c| candidate.concerns.contains(c))
        .count();
    score += CONCERN_OVERLAP_BONUS * shared as f64;

    if (query.irritation_history - candidate.irritation_history).abs() < SENSITIVITY_THRESHOLD {
        score += SENSITIVITY_BONUS;
    }

    score.clamp(0.0, 1.0)
}

/// Scans a candidate pool for the users most similar to a query fingerprint.
///
/// The matcher is stateless apart from an optional dedicated worker pool,
/// which is built on first use when [`BatchConfig::worker_threads`] is set.
pub struct Matcher {
    config: BatchConfig,
    clock: Arc<dyn Clock>,
    workers: OnceLock<Result<ThreadPool, String>>,
}

impl Matcher {
    pub fn new(config: BatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            workers: OnceLock::new(),
        })
    }

    /// Stamp `matched_at` from the given clock instead of wall-clock time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Rank `pool` against `query`, best first, at most `limit` results.
    ///
    /// When parallel processing is enabled the pool is split into chunks of
    /// `max_batch_size` that are scored concurrently; the ranked output is
    /// identical to [`Matcher::find_matches_sequential`].
    pub fn find_matches(
        &self,
        query: &Fingerprint,
        pool: &[CandidateProfile],
        limit: usize,
    ) -> Vec<MatchResult> {
        let start = Instant::now();
        let span = tracing::span!(
            Level::DEBUG,
            "matcher.find_matches",
            pool_size = pool.len(),
            limit
        );
        let _guard = span.enter();

        let now = self.clock.now();
        let mut results =
            if self.config.enable_parallel_processing && pool.len() > self.config.max_batch_size {
                self.install(|| self.score_chunked(query, pool, now))
            } else {
                self.score_all(query, pool, now)
            };
        rank(&mut results, limit);

        let elapsed_micros = start.elapsed().as_micros();
        debug!(matches = results.len(), elapsed_micros, "find_matches_success");
        results
    }

    /// Single-threaded reference path.
    pub fn find_matches_sequential(
        &self,
        query: &Fingerprint,
        pool: &[CandidateProfile],
        limit: usize,
    ) -> Vec<MatchResult> {
        let mut results = self.score_all(query, pool, self.clock.now());
        rank(&mut results, limit);
        results
    }

    /// Match several queries against the same pool.
    ///
    /// Queries are taken in batches of `max_batch_size`; the queries of one
    /// batch run concurrently when parallel processing is enabled. Output
    /// order follows input order. Fails only when a dedicated worker pool is
    /// configured and cannot be built.
    pub fn find_matches_batch(
        &self,
        queries: &[Fingerprint],
        pool: &[CandidateProfile],
        limit: usize,
    ) -> Result<Vec<Vec<MatchResult>>, MatchError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "matcher.find_matches_batch",
            queries = queries.len(),
            pool_size = pool.len()
        );
        let _guard = span.enter();

        let results = match self.worker_pool() {
            Some(Err(msg)) => return Err(MatchError::WorkerPool(msg.clone())),
            Some(Ok(workers)) => workers.install(|| self.run_batches(queries, pool, limit)),
            None => self.run_batches(queries, pool, limit),
        };

        let elapsed_micros = start.elapsed().as_micros();
        debug!(queries = results.len(), elapsed_micros, "find_matches_batch_success");
        Ok(results)
    }

    /// [`Matcher::find_matches_batch`] that degrades to a sequential scan when
    /// the worker pool is unavailable. Results are the same either way.
    pub fn find_matches_batch_with_fallback(
        &self,
        queries: &[Fingerprint],
        pool: &[CandidateProfile],
        limit: usize,
    ) -> Vec<Vec<MatchResult>> {
        match self.find_matches_batch(queries, pool, limit) {
            Ok(results) => results,
            Err(err) => {
                warn!(error = %err, queries = queries.len(), "matcher_sequential_fallback");
                queries
                    .iter()
                    .map(|q| self.find_matches_sequential(q, pool, limit))
                    .collect()
            }
        }
    }

    fn run_batches(
        &self,
        queries: &[Fingerprint],
        pool: &[CandidateProfile],
        limit: usize,
    ) -> Vec<Vec<MatchResult>> {
        let mut out = Vec::with_capacity(queries.len());
        for batch in queries.chunks(self.config.max_batch_size) {
            if self.config.enable_parallel_processing {
                let ranked: Vec<Vec<MatchResult>> = batch
                    .par_iter()
                    .map(|q| self.find_matches_sequential(q, pool, limit))
                    .collect();
                out.extend(ranked);
            } else {
                out.extend(
                    batch
                        .iter()
                        .map(|q| self.find_matches_sequential(q, pool, limit)),
                );
            }
        }
        out
    }

    fn score_all(
        &self,
        query: &Fingerprint,
        pool: &[CandidateProfile],
        now: DateTime<Utc>,
    ) -> Vec<MatchResult> {
        let qv = query.vector();
        pool.iter()
            .filter_map(|c| self.score_candidate(query, &qv, c, now))
            .collect()
    }

    fn score_chunked(
        &self,
        query: &Fingerprint,
        pool: &[CandidateProfile],
        now: DateTime<Utc>,
    ) -> Vec<MatchResult> {
        let qv = query.vector();
        pool.par_chunks(self.config.max_batch_size)
            .flat_map_iter(|chunk| {
                chunk
                    .iter()
                    .filter_map(|c| self.score_candidate(query, &qv, c, now))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn score_candidate(
        &self,
        query: &Fingerprint,
        query_vector: &[f64],
        candidate: &CandidateProfile,
        now: DateTime<Utc>,
    ) -> Option<MatchResult> {
        let fp = candidate.fingerprint.as_ref()?;
        let similarity = if fp.dimensions() != query_vector.len() {
            0.0
        } else {
            adjust(cosine_similarity(query_vector, &fp.vector()), query, fp)
        };
        if similarity < self.config.min_similarity {
            return None;
        }

        Some(MatchResult {
            candidate_id: candidate.id,
            similarity,
            level: MatchLevel::from_similarity(similarity),
            profile: candidate.anonymous.clone(),
            effective_products: candidate.effective_products.clone(),
            matched_at: now,
        })
    }

    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self.worker_pool() {
            Some(Ok(workers)) => workers.install(op),
            _ => op(),
        }
    }

    fn worker_pool(&self) -> Option<&Result<ThreadPool, String>> {
        let threads = self.config.worker_threads?;
        Some(self.workers.get_or_init(|| {
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("twin-matcher-{i}"))
                .build()
                .map_err(|err| {
                    warn!(error = %err, threads, "matcher_worker_pool_build_failed");
                    err.to_string()
                })
        }))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            config: BatchConfig::default(),
            clock: Arc::new(SystemClock),
            workers: OnceLock::new(),
        }
    }
}

/// Similarity descending, ties by candidate id ascending.
fn rank(results: &mut Vec<MatchResult>, limit: usize) {
    results.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    results.truncate(limit);
}
