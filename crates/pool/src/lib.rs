//! # SkinTwin Pool (`pool`)
//!
//! Collaborator boundary of the matching pipeline. The core never talks to a
//! storage engine directly; it goes through two async traits:
//!
//! - [`PoolRepository`]: eligible candidate profiles plus the persisted
//!   [`MatchRecord`]s that back the second cache level.
//! - [`HistoryStore`]: the querying user's own analyses and per-ingredient
//!   outcome stats, which feed fingerprinting and product scoring.
//!
//! [`InMemoryPoolRepository`] and [`InMemoryHistoryStore`] implement both
//! traits over lock-guarded maps with an injected clock. They back the test
//! suites and the demo binary, and are usable for embedding.
//!
//! Lock poisoning surfaces as [`RepositoryError::Poisoned`]; nothing in this
//! crate panics on a poisoned lock.

pub mod error;
pub mod history;
pub mod record;
pub mod repository;

pub use crate::error::RepositoryError;
pub use crate::history::{
    history_snapshot, ExposureFeeling, HistoryStore, InMemoryHistoryStore, IngredientEffectStats,
    IssueScores, DEFAULT_SEVERE_THRESHOLD, RECENT_ANALYSES, RECENT_EXPOSURES,
};
pub use crate::record::{MatchRecord, MATCH_RECORD_TTL_HOURS};
pub use crate::repository::{InMemoryPoolRepository, PoolRepository, DEFAULT_POOL_LIMIT};
