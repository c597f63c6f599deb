use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::similarity::cosine_similarity;
use crate::types::{AgeRange, BudgetLevel, FragranceTolerance, SkinConcern, SkinType, UvExposure};

/// Number of historical issue dimensions carried by a fingerprint.
pub const ISSUE_VECTOR_LEN: usize = 5;

/// Value used for missing issue dimensions.
pub const NEUTRAL_ISSUE_VALUE: f64 = 0.5;

/// Length of [`Fingerprint::vector`] for fingerprints built through
/// [`Fingerprint::new`].
pub const FINGERPRINT_DIMENSIONS: usize =
    SkinType::ALL.len() + 1 + SkinConcern::ALL.len() + ISSUE_VECTOR_LEN + 4;

/// Anonymized skin profile used for twin matching.
///
/// Fields are public so stored fingerprints can be deserialized as-is; a
/// fingerprint whose issue vector has the wrong length still vectorizes, it
/// just fails the dimension check in the matcher and scores 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub skin_type: SkinType,
    pub age_range: AgeRange,
    pub concerns: Vec<SkinConcern>,
    /// Historical issue severities in [0, 1].
    pub issue_vector: Vec<f64>,
    pub fragrance_tolerance: FragranceTolerance,
    pub uv_exposure: UvExposure,
    /// Average irritation level from past analyses, in [0, 1].
    pub irritation_history: f64,
    pub budget_level: BudgetLevel,
}

impl Fingerprint {
    /// Build a fingerprint with a normalized issue vector.
    ///
    /// Issue values are clamped into [0, 1] and the vector is truncated or
    /// padded with [`NEUTRAL_ISSUE_VALUE`] to exactly [`ISSUE_VECTOR_LEN`]
    /// entries. Duplicate concerns are dropped, first occurrence wins.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        skin_type: SkinType,
        age_range: AgeRange,
        concerns: Vec<SkinConcern>,
        issue_vector: Vec<f64>,
        fragrance_tolerance: FragranceTolerance,
        uv_exposure: UvExposure,
        irritation_history: f64,
        budget_level: BudgetLevel,
    ) -> Self {
        let mut issues: Vec<f64> = issue_vector
            .into_iter()
            .take(ISSUE_VECTOR_LEN)
            .map(clamp_unit)
            .collect();
        issues.resize(ISSUE_VECTOR_LEN, NEUTRAL_ISSUE_VALUE);

        let mut unique = Vec::with_capacity(concerns.len());
        for concern in concerns {
            if !unique.contains(&concern) {
                unique.push(concern);
            }
        }

        Self {
            skin_type,
            age_range,
            concerns: unique,
            issue_vector: issues,
            fragrance_tolerance,
            uv_exposure,
            irritation_history: clamp_unit(irritation_history),
            budget_level,
        }
    }

    /// Dense feature vector in canonical order:
    /// one-hot skin type, age, multi-hot concerns, issues, fragrance, UV,
    /// irritation, budget.
    pub fn vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(FINGERPRINT_DIMENSIONS);

        v.extend(
            SkinType::ALL
                .iter()
                .map(|t| if *t == self.skin_type { 1.0 } else { 0.0 }),
        );
        v.push(self.age_range.normalized());
        v.extend(SkinConcern::ALL.iter().map(|c| {
            if self.concerns.contains(c) {
                1.0
            } else {
                0.0
            }
        }));
        v.extend_from_slice(&self.issue_vector);
        v.push(self.fragrance_tolerance.normalized());
        v.push(self.uv_exposure.normalized());
        v.push(self.irritation_history);
        v.push(self.budget_level.normalized());

        v
    }

    /// Length of [`Self::vector`] without materializing it.
    pub fn dimensions(&self) -> usize {
        SkinType::ALL.len() + 1 + SkinConcern::ALL.len() + self.issue_vector.len() + 4
    }

    /// Plain cosine similarity of the two feature vectors.
    pub fn similarity(&self, other: &Fingerprint) -> f64 {
        cosine_similarity(&self.vector(), &other.vector())
    }

    /// Stable hash over every vectorized attribute.
    ///
    /// Concern order does not matter; float fields hash by bit pattern.
    /// Used as the cache validity key, so it must stay stable across
    /// processes (xxh3 with a fixed seed).
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(&[self.skin_type as u8, self.age_range as u8]);

        let mut concerns: Vec<u8> = self.concerns.iter().map(|c| *c as u8).collect();
        concerns.sort_unstable();
        concerns.dedup();
        hasher.update(&(concerns.len() as u32).to_le_bytes());
        hasher.update(&concerns);

        hasher.update(&(self.issue_vector.len() as u32).to_le_bytes());
        for value in &self.issue_vector {
            hasher.update(&value.to_bits().to_le_bytes());
        }

        hasher.update(&[
            self.fragrance_tolerance as u8,
            self.uv_exposure as u8,
            self.budget_level as u8,
        ]);
        hasher.update(&self.irritation_history.to_bits().to_le_bytes());
        hasher.digest()
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        NEUTRAL_ISSUE_VALUE
    } else {
        value.clamp(0.0, 1.0)
    }
}
