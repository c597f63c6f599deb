use chrono::{DateTime, Utc};
use fingerprint::{AnonymousProfile, EffectiveProduct};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default number of candidates scored per parallel chunk.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 5;

/// Default admission floor for a match.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.6;

/// Default number of matches returned per query.
pub const DEFAULT_MATCH_LIMIT: usize = 20;

/// Coarse similarity tier shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    Twin,
    VerySimilar,
    Similar,
    SomewhatSimilar,
}

impl MatchLevel {
    /// Tier for a similarity score. Exact boundaries go to the higher tier.
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity >= 0.9 {
            MatchLevel::Twin
        } else if similarity >= 0.8 {
            MatchLevel::VerySimilar
        } else if similarity >= 0.7 {
            MatchLevel::Similar
        } else {
            MatchLevel::SomewhatSimilar
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MatchLevel::Twin => "Skin Twin",
            MatchLevel::VerySimilar => "Very Similar",
            MatchLevel::Similar => "Similar",
            MatchLevel::SomewhatSimilar => "Somewhat Similar",
        }
    }
}

/// A single ranked candidate returned by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: Uuid,
    /// Weighted similarity in [0, 1].
    pub similarity: f64,
    pub level: MatchLevel,
    /// Snapshot of the candidate taken at match time.
    pub profile: AnonymousProfile,
    pub effective_products: Vec<EffectiveProduct>,
    pub matched_at: DateTime<Utc>,
}

impl MatchResult {
    /// Similarity as a whole percentage, for display.
    pub fn similarity_percent(&self) -> u32 {
        (self.similarity * 100.0).round() as u32
    }
}

/// Tuning knobs for pool scans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Chunk size for the single-query path and batch size for multi-query runs.
    #[serde(default = "BatchConfig::default_max_batch_size")]
    pub max_batch_size: usize,
    /// Results below this weighted similarity are dropped.
    #[serde(default = "BatchConfig::default_min_similarity")]
    pub min_similarity: f64,
    #[serde(default = "BatchConfig::default_enable_parallel")]
    pub enable_parallel_processing: bool,
    /// Size of a dedicated worker pool; `None` uses the global rayon pool.
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl BatchConfig {
    pub(crate) fn default_max_batch_size() -> usize {
        DEFAULT_MAX_BATCH_SIZE
    }

    pub(crate) fn default_min_similarity() -> f64 {
        DEFAULT_MIN_SIMILARITY
    }

    pub(crate) fn default_enable_parallel() -> bool {
        true
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    pub fn with_min_similarity(mut self, min: f64) -> Self {
        self.min_similarity = min;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.enable_parallel_processing = enabled;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_batch_size == 0 {
            return Err(MatchError::InvalidConfig(
                "max_batch_size must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(MatchError::InvalidConfig(
                "min_similarity must be between 0.0 and 1.0".into(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(MatchError::InvalidConfig(
                "worker_threads must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Self::default_max_batch_size(),
            min_similarity: Self::default_min_similarity(),
            enable_parallel_processing: Self::default_enable_parallel(),
            worker_threads: None,
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The dedicated worker pool could not be built.
    #[error("worker pool unavailable: {0}")]
    WorkerPool(String),
}
