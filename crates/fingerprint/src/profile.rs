//! User profiles and the memoized fingerprint build.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::FingerprintError;
use crate::fingerprint::{Fingerprint, ISSUE_VECTOR_LEN, NEUTRAL_ISSUE_VALUE};
use crate::product::EffectiveProduct;
use crate::types::{
    AgeRange, BudgetLevel, ConsentLevel, FragranceTolerance, SkinConcern, SkinType, UvExposure,
};

/// A memoized fingerprint is rebuilt once it is this old.
pub const FINGERPRINT_STALE_AFTER_HOURS: i64 = 24;

/// Issue dimensions carried by an anonymous profile snapshot.
pub const ANONYMOUS_ISSUE_LEN: usize = 7;

/// Maximum number of concerns exposed in an anonymous profile.
pub const ANONYMOUS_MAX_CONCERNS: usize = 3;

const IRRITATION_SEVERE: f64 = 0.7;
const IRRITATION_MILD: f64 = 0.3;
const IRRITATION_UNKNOWN: f64 = 0.5;

/// Average issue scores over the user's recent analyses, each on a 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IssueBaseline {
    pub spots: f64,
    pub acne: f64,
    pub pores: f64,
    pub wrinkles: f64,
    pub redness: f64,
}

impl IssueBaseline {
    /// Issue severities scaled into [0, 1].
    pub fn normalized(&self) -> [f64; ISSUE_VECTOR_LEN] {
        [
            self.spots / 10.0,
            self.acne / 10.0,
            self.pores / 10.0,
            self.wrinkles / 10.0,
            self.redness / 10.0,
        ]
    }
}

/// History-derived inputs to a fingerprint build.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub baseline: Option<IssueBaseline>,
    pub severe_redness: bool,
    pub severe_acne: bool,
}

impl HistorySnapshot {
    fn irritation_score(&self) -> f64 {
        if self.severe_redness || self.severe_acne {
            IRRITATION_SEVERE
        } else {
            IRRITATION_MILD
        }
    }
}

/// Privacy-reduced view of a profile that may be shown to other users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousProfile {
    pub skin_type: SkinType,
    pub age_range: AgeRange,
    pub main_concerns: Vec<SkinConcern>,
    pub issue_vector: Vec<f64>,
    /// Province or country level only.
    pub region: Option<String>,
}

impl AnonymousProfile {
    /// Concerns this snapshot shares with `concerns`.
    pub fn common_concerns(&self, concerns: &[SkinConcern]) -> Vec<SkinConcern> {
        self.main_concerns
            .iter()
            .filter(|c| concerns.contains(c))
            .copied()
            .collect()
    }
}

/// Pool entry as supplied by the pool repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub consent: ConsentLevel,
    /// Precomputed fingerprint; candidates without one are never matched.
    pub fingerprint: Option<Fingerprint>,
    pub anonymous: AnonymousProfile,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub effective_products: Vec<EffectiveProduct>,
}

impl CandidateProfile {
    /// Snapshot a user profile into a pool entry. A profile that cannot
    /// produce a fingerprint yields a candidate without one.
    pub fn from_profile(
        profile: &mut UserProfile,
        history: Option<&HistorySnapshot>,
        clock: &dyn Clock,
        effective_products: Vec<EffectiveProduct>,
    ) -> Self {
        let fingerprint = profile.fingerprint(history, clock).ok();
        let anonymous = profile.to_anonymous(history.and_then(|h| h.baseline.as_ref()));
        Self {
            id: profile.id,
            consent: profile.consent(),
            fingerprint,
            anonymous,
            updated_at: profile.updated_at,
            effective_products,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CachedFingerprint {
    fingerprint: Fingerprint,
    built_at: DateTime<Utc>,
}

/// Stored user attributes plus a memoized fingerprint.
///
/// Every setter for a vectorized attribute drops the memo, so the next
/// [`UserProfile::fingerprint`] call rebuilds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    skin_type: Option<SkinType>,
    age_range: AgeRange,
    concerns: Vec<SkinConcern>,
    fragrance_tolerance: FragranceTolerance,
    uv_exposure: UvExposure,
    budget_level: BudgetLevel,
    consent: ConsentLevel,
    pub region: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub last_matched_at: Option<DateTime<Utc>>,
    cached: Option<CachedFingerprint>,
}

impl UserProfile {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            skin_type: None,
            age_range: AgeRange::default(),
            concerns: Vec::new(),
            fragrance_tolerance: FragranceTolerance::default(),
            uv_exposure: UvExposure::default(),
            budget_level: BudgetLevel::default(),
            consent: ConsentLevel::None,
            region: None,
            updated_at: Utc::now(),
            last_matched_at: None,
            cached: None,
        }
    }

    pub fn with_skin_type(mut self, skin_type: SkinType) -> Self {
        self.set_skin_type(Some(skin_type));
        self
    }

    pub fn with_age_range(mut self, age_range: AgeRange) -> Self {
        self.set_age_range(age_range);
        self
    }

    pub fn with_concerns(mut self, concerns: Vec<SkinConcern>) -> Self {
        self.set_concerns(concerns);
        self
    }

    pub fn with_fragrance_tolerance(mut self, tolerance: FragranceTolerance) -> Self {
        self.set_fragrance_tolerance(tolerance);
        self
    }

    pub fn with_uv_exposure(mut self, uv: UvExposure) -> Self {
        self.set_uv_exposure(uv);
        self
    }

    pub fn with_budget_level(mut self, budget: BudgetLevel) -> Self {
        self.set_budget_level(budget);
        self
    }

    pub fn with_consent(mut self, consent: ConsentLevel) -> Self {
        self.consent = consent;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn skin_type(&self) -> Option<SkinType> {
        self.skin_type
    }

    pub fn age_range(&self) -> AgeRange {
        self.age_range
    }

    pub fn concerns(&self) -> &[SkinConcern] {
        &self.concerns
    }

    pub fn consent(&self) -> ConsentLevel {
        self.consent
    }

    pub fn set_skin_type(&mut self, skin_type: Option<SkinType>) {
        self.skin_type = skin_type;
        self.invalidate_fingerprint();
    }

    pub fn set_age_range(&mut self, age_range: AgeRange) {
        self.age_range = age_range;
        self.invalidate_fingerprint();
    }

    pub fn set_concerns(&mut self, concerns: Vec<SkinConcern>) {
        self.concerns = concerns;
        self.invalidate_fingerprint();
    }

    pub fn set_fragrance_tolerance(&mut self, tolerance: FragranceTolerance) {
        self.fragrance_tolerance = tolerance;
        self.invalidate_fingerprint();
    }

    pub fn set_uv_exposure(&mut self, uv: UvExposure) {
        self.uv_exposure = uv;
        self.invalidate_fingerprint();
    }

    pub fn set_budget_level(&mut self, budget: BudgetLevel) {
        self.budget_level = budget;
        self.invalidate_fingerprint();
    }

    /// Consent does not feed the fingerprint, so the memo survives.
    pub fn set_consent(&mut self, consent: ConsentLevel) {
        self.consent = consent;
    }

    pub fn invalidate_fingerprint(&mut self) {
        self.cached = None;
    }

    /// Build time of the memoized fingerprint, if any.
    pub fn fingerprint_built_at(&self) -> Option<DateTime<Utc>> {
        self.cached.as_ref().map(|c| c.built_at)
    }

    /// Return the memoized fingerprint while it is fresher than
    /// [`FINGERPRINT_STALE_AFTER_HOURS`], otherwise rebuild and memoize it.
    ///
    /// Without history the issue vector is neutral and the irritation score
    /// is 0.5.
    pub fn fingerprint(
        &mut self,
        history: Option<&HistorySnapshot>,
        clock: &dyn Clock,
    ) -> Result<Fingerprint, FingerprintError> {
        let now = clock.now();
        if let Some(cached) = &self.cached {
            if now - cached.built_at < Duration::hours(FINGERPRINT_STALE_AFTER_HOURS) {
                return Ok(cached.fingerprint.clone());
            }
        }

        let skin_type = self
            .skin_type
            .ok_or(FingerprintError::MissingSkinType { profile_id: self.id })?;

        let issue_vector = history
            .and_then(|h| h.baseline)
            .map(|b| b.normalized().to_vec())
            .unwrap_or_else(|| vec![NEUTRAL_ISSUE_VALUE; ISSUE_VECTOR_LEN]);
        let irritation = history
            .map(HistorySnapshot::irritation_score)
            .unwrap_or(IRRITATION_UNKNOWN);

        let fingerprint = Fingerprint::new(
            skin_type,
            self.age_range,
            self.concerns.clone(),
            issue_vector,
            self.fragrance_tolerance,
            self.uv_exposure,
            irritation,
            self.budget_level,
        );

        debug!(profile_id = %self.id, "fingerprint_rebuilt");
        self.cached = Some(CachedFingerprint {
            fingerprint: fingerprint.clone(),
            built_at: now,
        });
        Ok(fingerprint)
    }

    /// Anonymized snapshot for community display.
    pub fn to_anonymous(&self, baseline: Option<&IssueBaseline>) -> AnonymousProfile {
        let issue_vector = match baseline {
            Some(b) => {
                let mut v = b.normalized().to_vec();
                // evenness and texture are not tracked by the baseline
                v.resize(ANONYMOUS_ISSUE_LEN, NEUTRAL_ISSUE_VALUE);
                v
            }
            None => vec![NEUTRAL_ISSUE_VALUE; ANONYMOUS_ISSUE_LEN],
        };

        AnonymousProfile {
            skin_type: self.skin_type.unwrap_or(SkinType::Combination),
            age_range: self.age_range,
            main_concerns: self
                .concerns
                .iter()
                .take(ANONYMOUS_MAX_CONCERNS)
                .copied()
                .collect(),
            issue_vector,
            region: coarse_region(self.region.as_deref()),
        }
    }
}

fn coarse_region(region: Option<&str>) -> Option<String> {
    region
        .and_then(|r| r.split_whitespace().next())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn profile() -> UserProfile {
        UserProfile::new(Uuid::new_v4())
            .with_skin_type(SkinType::Oily)
            .with_concerns(vec![
                SkinConcern::Acne,
                SkinConcern::Pores,
                SkinConcern::Oiliness,
                SkinConcern::Redness,
            ])
            .with_region("Guangdong Shenzhen Nanshan")
    }

    #[test]
    fn missing_skin_type_has_no_fingerprint() {
        let clock = ManualClock::starting_now();
        let mut p = UserProfile::new(Uuid::new_v4());
        let err = p.fingerprint(None, &clock).unwrap_err();
        assert!(matches!(err, FingerprintError::MissingSkinType { .. }));
    }

    #[test]
    fn fingerprint_is_memoized_within_window() {
        let clock = ManualClock::starting_now();
        let mut p = profile();
        let first = p.fingerprint(None, &clock).unwrap();
        let built_at = p.fingerprint_built_at().unwrap();

        clock.advance(Duration::hours(23));
        let history = HistorySnapshot {
            severe_acne: true,
            ..Default::default()
        };
        // still memoized, so the new history is not picked up yet
        let second = p.fingerprint(Some(&history), &clock).unwrap();
        assert_eq!(first, second);
        assert_eq!(p.fingerprint_built_at(), Some(built_at));
    }

    #[test]
    fn fingerprint_rebuilds_after_staleness_window() {
        let clock = ManualClock::starting_now();
        let mut p = profile();
        let first = p.fingerprint(None, &clock).unwrap();
        assert_eq!(first.irritation_history, 0.5);

        clock.advance(Duration::hours(24));
        let history = HistorySnapshot {
            severe_redness: true,
            ..Default::default()
        };
        let rebuilt = p.fingerprint(Some(&history), &clock).unwrap();
        assert_eq!(rebuilt.irritation_history, 0.7);
        assert_eq!(p.fingerprint_built_at(), Some(clock.now()));
    }

    #[test]
    fn attribute_change_invalidates_memo() {
        let clock = ManualClock::starting_now();
        let mut p = profile();
        let first = p.fingerprint(None, &clock).unwrap();

        p.set_budget_level(BudgetLevel::Luxury);
        assert!(p.fingerprint_built_at().is_none());
        let second = p.fingerprint(None, &clock).unwrap();
        assert_ne!(first.content_hash(), second.content_hash());
    }

    #[test]
    fn consent_change_keeps_memo() {
        let clock = ManualClock::starting_now();
        let mut p = profile();
        p.fingerprint(None, &clock).unwrap();
        p.set_consent(ConsentLevel::Public);
        assert!(p.fingerprint_built_at().is_some());
    }

    #[test]
    fn history_feeds_issue_vector_and_irritation() {
        let clock = ManualClock::starting_now();
        let mut p = profile();
        let history = HistorySnapshot {
            baseline: Some(IssueBaseline {
                spots: 3.0,
                acne: 6.0,
                pores: 5.0,
                wrinkles: 2.0,
                redness: 4.0,
            }),
            severe_redness: false,
            severe_acne: false,
        };
        let fp = p.fingerprint(Some(&history), &clock).unwrap();
        assert_eq!(fp.issue_vector, vec![0.3, 0.6, 0.5, 0.2, 0.4]);
        assert_eq!(fp.irritation_history, 0.3);
    }

    #[test]
    fn anonymous_profile_is_reduced() {
        let anon = profile().to_anonymous(None);
        assert_eq!(anon.main_concerns.len(), ANONYMOUS_MAX_CONCERNS);
        assert_eq!(anon.issue_vector, vec![0.5; ANONYMOUS_ISSUE_LEN]);
        assert_eq!(anon.region.as_deref(), Some("Guangdong"));
        assert_eq!(
            anon.common_concerns(&[SkinConcern::Pores, SkinConcern::Aging]),
            vec![SkinConcern::Pores]
        );
    }

    #[test]
    fn candidate_snapshot_carries_fingerprint() {
        let clock = ManualClock::starting_now();
        let mut p = profile().with_consent(ConsentLevel::Anonymous);
        let candidate = CandidateProfile::from_profile(&mut p, None, &clock, vec![]);
        assert_eq!(candidate.id, p.id);
        assert!(candidate.fingerprint.is_some());
        assert_eq!(candidate.consent, ConsentLevel::Anonymous);

        let mut bare = UserProfile::new(Uuid::new_v4());
        let candidate = CandidateProfile::from_profile(&mut bare, None, &clock, vec![]);
        assert!(candidate.fingerprint.is_none());
    }
}
