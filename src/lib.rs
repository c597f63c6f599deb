//! Workspace umbrella crate for SkinTwin.
//!
//! SkinTwin finds a user's "skin twins" (the most similar other users in a
//! consenting pool) and recommends the products those twins found effective.
//! The stages live in their own crates and are re-exported here:
//!
//! | crate          | role                                                    |
//! |----------------|---------------------------------------------------------|
//! | `fingerprint`  | profile model, fingerprint vectors, cosine similarity   |
//! | `matcher`      | weighted similarity, chunked parallel pool scans        |
//! | `pool`         | pool repository and history store traits, match records |
//! | `recommend`    | multi-factor product scoring and ranking                |
//! | `cache`        | per-user LRU cache with TTL and fingerprint-hash checks |
//!
//! [`TwinService`] wires them together and [`SkinTwinConfig`] loads their
//! tuning from YAML.

pub mod config;
pub mod service;

pub use cache::{CacheConfig, CacheEntry, CacheError, CacheStats, MatchCache, SharedMatchCache};
pub use fingerprint::{
    AgeRange, AnonymousProfile, BudgetLevel, CandidateProfile, Clock, ConsentLevel,
    EffectiveProduct, Fingerprint, FingerprintError, FragranceTolerance, HistorySnapshot,
    Ingredient, IngredientFunction, IrritationLevel, IssueBaseline, ManualClock, Product,
    ProductCategory, SkinConcern, SkinIssue, SkinType, SystemClock, UserProfile, UvExposure,
    cosine_similarity,
};
pub use matcher::{BatchConfig, MatchError, MatchLevel, MatchResult, Matcher, weighted_similarity};
pub use pool::{
    ExposureFeeling, HistoryStore, InMemoryHistoryStore, InMemoryPoolRepository,
    IngredientEffectStats, IssueScores, MatchRecord, PoolRepository, RepositoryError,
    history_snapshot,
};
pub use recommend::{
    Evidence, RecommendConfig, RecommendError, RecommendationEngine, RecommendationLevel,
    RecommendationScore,
};

pub use crate::config::{ConfigLoadError, PoolYamlConfig, SkinTwinConfig};
pub use crate::service::{
    MatchSource, MatchStats, PurgeSummary, ServiceError, TwinReport, TwinService,
};
