//! # SkinTwin Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` ranks a bounded pool of candidate profiles against a query
//! [`fingerprint::Fingerprint`] and returns the users most likely to share
//! the querying user's skin ("skin twins").
//!
//! The pool is scanned linearly; there is no index. Each candidate is scored
//! with [`weighted_similarity`]: cosine similarity of the 22-dimension
//! feature vectors, adjusted for skin type, age bracket, shared concerns and
//! irritation history, then clamped to [0, 1].
//!
//! ## Core Types
//!
//! - [`BatchConfig`]: chunk size, admission floor, parallelism switch and an
//!   optional dedicated worker pool size.
//! - [`MatchResult`]: candidate id, similarity, [`MatchLevel`], anonymous
//!   snapshot and the products that candidate found effective.
//! - [`Matcher`]: single-query and batched scans, with a sequential fallback.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{BatchConfig, Matcher};
//! use fingerprint::{
//!     AgeRange, BudgetLevel, Fingerprint, FragranceTolerance, SkinConcern, SkinType, UvExposure,
//! };
//!
//! let matcher = Matcher::new(BatchConfig::default()).unwrap();
//! let query = Fingerprint::new(
//!     SkinType::Oily,
//!     AgeRange::Age25To30,
//!     vec![SkinConcern::Acne],
//!     vec![0.5; 5],
//!     FragranceTolerance::Neutral,
//!     UvExposure::Medium,
//!     0.3,
//!     BudgetLevel::Moderate,
//! );
//!
//! let hits = matcher.find_matches(&query, &[], 20);
//! assert!(hits.is_empty());
//! ```
//!
//! ## Observability
//!
//! Every scan opens a `tracing` span and reports `elapsed_micros` on
//! completion. Falling back to a sequential scan is logged at `warn`.

pub mod engine;
pub mod types;

pub use crate::engine::{weighted_similarity, Matcher};
pub use crate::types::{
    BatchConfig, MatchError, MatchLevel, MatchResult, DEFAULT_MATCH_LIMIT, DEFAULT_MAX_BATCH_SIZE,
    DEFAULT_MIN_SIMILARITY,
};
