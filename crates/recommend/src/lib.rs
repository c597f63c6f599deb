//! # SkinTwin Recommend (`recommend`)
//!
//! Turns a user's skin-twin matches into ranked product recommendations.
//!
//! Each candidate product (any product a match found effective) is scored
//! from four factors:
//!
//! 1. **Twin effectiveness** (0.4): similarity-weighted average improvement
//!    reported by the matches that used the product.
//! 2. **Ingredient match** (0.3): targeted skin types, ingredient functions
//!    that address the user's concerns, fragrance tolerance and the user's
//!    own per-ingredient history.
//! 3. **Concern match** (0.2): overlap between the user's concerns and the
//!    product's targets, favouring the user's top two concerns.
//! 4. **Risk penalty** (−0.1): irritating ingredients, amplified for
//!    sensitive or reactive skin and for ingredients the user reacted badly to.
//!
//! The weighted sum is clamped to [0, 1]; products below the admission
//! floor (0.3) are dropped. Weights and floor live in [`RecommendConfig`].
//!
//! The factor functions in [`scoring`] are pure; [`RecommendationEngine`]
//! adds the single history fetch per request and parallel scoring.

pub mod config;
pub mod engine;
pub mod scoring;
pub mod types;

pub use crate::config::RecommendConfig;
pub use crate::engine::RecommendationEngine;
pub use crate::scoring::{
    concern_match, ingredient_match, risk_penalty, score_product, twin_effectiveness,
};
pub use crate::types::{Evidence, RecommendError, RecommendationLevel, RecommendationScore};
