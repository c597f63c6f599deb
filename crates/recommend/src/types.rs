use fingerprint::Product;
use pool::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLevel {
    HighlyRecommended,
    Recommended,
    MaybeHelpful,
    NotRecommended,
}

impl RecommendationLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RecommendationLevel::HighlyRecommended
        } else if score >= 0.6 {
            RecommendationLevel::Recommended
        } else if score >= 0.4 {
            RecommendationLevel::MaybeHelpful
        } else {
            RecommendationLevel::NotRecommended
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RecommendationLevel::HighlyRecommended => "Highly recommended",
            RecommendationLevel::Recommended => "Recommended",
            RecommendationLevel::MaybeHelpful => "Maybe helpful",
            RecommendationLevel::NotRecommended => "Not recommended",
        }
    }
}

/// Usage evidence collected from the matches that used a product.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Evidence {
    pub effective_user_count: usize,
    pub avg_similarity: f64,
    /// Similarity-weighted average improvement in [0, 1].
    pub avg_improvement: f64,
    pub avg_usage_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationScore {
    pub product: Product,
    /// Final score in [0, 1].
    pub score: f64,
    pub reasons: Vec<String>,
    pub evidence: Evidence,
}

impl RecommendationScore {
    pub fn level(&self) -> RecommendationLevel {
        RecommendationLevel::from_score(self.score)
    }

    pub fn score_percent(&self) -> u32 {
        (self.score * 100.0) as u32
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommendError {
    #[error("invalid recommend config: {0}")]
    InvalidConfig(String),
    #[error("history unavailable: {0}")]
    History(#[from] RepositoryError),
}
