//! Persisted form of a match result.

use chrono::{DateTime, Duration, Utc};
use fingerprint::{AnonymousProfile, EffectiveProduct};
use matcher::{MatchLevel, MatchResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted match records expire this long after they are written.
pub const MATCH_RECORD_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    /// User the match was computed for.
    pub user_id: Uuid,
    pub candidate_id: Uuid,
    /// Content hash of the fingerprint the match was computed from.
    pub content_hash: u64,
    pub similarity: f64,
    pub level: MatchLevel,
    pub profile: AnonymousProfile,
    pub effective_products: Vec<EffectiveProduct>,
    pub matched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn from_match(
        result: &MatchResult,
        user_id: Uuid,
        content_hash: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            candidate_id: result.candidate_id,
            content_hash,
            similarity: result.similarity,
            level: result.level,
            profile: result.profile.clone(),
            effective_products: result.effective_products.clone(),
            matched_at: result.matched_at,
            created_at: now,
            expires_at: now + Duration::hours(MATCH_RECORD_TTL_HOURS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the record was computed from a fingerprint with `content_hash`.
    pub fn matches_hash(&self, content_hash: u64) -> bool {
        self.content_hash == content_hash
    }

    pub fn into_match(self) -> MatchResult {
        MatchResult {
            candidate_id: self.candidate_id,
            similarity: self.similarity,
            level: self.level,
            profile: self.profile,
            effective_products: self.effective_products,
            matched_at: self.matched_at,
        }
    }
}
