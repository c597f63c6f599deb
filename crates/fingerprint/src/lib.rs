//! # SkinTwin Fingerprint
//!
//! This crate holds the skin fingerprint model shared by every other SkinTwin
//! crate: the closed attribute enums, the product catalogue types, user and
//! candidate profiles, and the dense feature vector used for matching.
//!
//! ## Contract
//!
//! - [`Fingerprint::vector`] is a pure function of the fingerprint. The same
//!   attributes always produce a bit identical vector of
//!   [`FINGERPRINT_DIMENSIONS`] entries.
//! - [`Fingerprint::content_hash`] covers every vectorized attribute and is
//!   stable across processes. Caches use it as their validity key.
//! - Time is read only through [`Clock`], so fingerprint memoization can be
//!   tested without sleeping.
//!
//! ## Vector layout
//!
//! | range    | content                                   |
//! |----------|-------------------------------------------|
//! | `0..4`   | one-hot skin type                         |
//! | `4`      | normalized age range                      |
//! | `5..13`  | multi-hot concerns                        |
//! | `13..18` | historical issue severities               |
//! | `18..22` | fragrance, UV exposure, irritation, budget |
//!
//! ## Example Usage
//!
//! ```
//! use fingerprint::{ManualClock, SkinConcern, SkinType, UserProfile};
//! use uuid::Uuid;
//!
//! let clock = ManualClock::starting_now();
//! let mut profile = UserProfile::new(Uuid::new_v4())
//!     .with_skin_type(SkinType::Oily)
//!     .with_concerns(vec![SkinConcern::Acne, SkinConcern::Pores]);
//!
//! let fp = profile.fingerprint(None, &clock).unwrap();
//! assert_eq!(fp.vector().len(), fingerprint::FINGERPRINT_DIMENSIONS);
//! assert!((fp.similarity(&fp) - 1.0).abs() < 1e-9);
//! ```
pub mod clock;
pub mod error;
pub mod fingerprint;
pub mod product;
pub mod profile;
pub mod similarity;
pub mod types;

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::FingerprintError;
pub use crate::fingerprint::{
    FINGERPRINT_DIMENSIONS, Fingerprint, ISSUE_VECTOR_LEN, NEUTRAL_ISSUE_VALUE,
};
pub use crate::product::{
    EffectiveProduct, Ingredient, IngredientFunction, IrritationLevel, Product, ProductCategory,
};
pub use crate::profile::{
    ANONYMOUS_ISSUE_LEN, ANONYMOUS_MAX_CONCERNS, AnonymousProfile, CandidateProfile,
    FINGERPRINT_STALE_AFTER_HOURS, HistorySnapshot, IssueBaseline, UserProfile,
};
pub use crate::similarity::cosine_similarity;
pub use crate::types::{
    AgeRange, BudgetLevel, ConsentLevel, FragranceTolerance, SkinConcern, SkinIssue, SkinType,
    UvExposure,
};
