//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use skintwin::{
    AgeRange, CandidateProfile, Clock, ConsentLevel, EffectiveProduct, FragranceTolerance,
    HistoryStore, InMemoryPoolRepository, Ingredient, IngredientEffectStats, IngredientFunction,
    IrritationLevel, IssueBaseline, MatchRecord, MatchResult, PoolRepository, Product,
    ProductCategory, RepositoryError, SkinConcern, SkinIssue, SkinType, UserProfile,
};
use uuid::Uuid;

pub fn serum() -> Product {
    Product::new("Clear Pore Serum", "Lumen", ProductCategory::Serum)
        .with_ingredients(vec![
            Ingredient::new("Niacinamide", IngredientFunction::AcneFighting),
            Ingredient::new("Salicylic Acid", IngredientFunction::Exfoliating)
                .with_risk(IrritationLevel::Medium),
        ])
        .with_skin_types(vec![SkinType::Oily])
        .with_concerns(vec![SkinConcern::Acne, SkinConcern::Pores])
}

pub fn cream() -> Product {
    Product::new("Barrier Cream", "Lumen", ProductCategory::Moisturizer)
        .with_ingredients(vec![Ingredient::new(
            "Ceramide NP",
            IngredientFunction::Moisturizing,
        )])
        .with_skin_types(vec![SkinType::Dry])
        .with_concerns(vec![SkinConcern::Dryness])
}

pub fn oily_user() -> UserProfile {
    UserProfile::new(Uuid::new_v4())
        .with_skin_type(SkinType::Oily)
        .with_age_range(AgeRange::Age25To30)
        .with_concerns(vec![SkinConcern::Acne, SkinConcern::Pores])
        .with_fragrance_tolerance(FragranceTolerance::Neutral)
        .with_consent(ConsentLevel::Anonymous)
}

/// A profile that looks exactly like [`oily_user`].
pub fn oily_twin(clock: &dyn Clock) -> CandidateProfile {
    let mut profile = oily_user();
    CandidateProfile::from_profile(
        &mut profile,
        None,
        clock,
        vec![EffectiveProduct::new(serum(), 60, 0.8)],
    )
}

/// [`oily_user`] with dry skin and nothing else changed.
pub fn dry_clone(clock: &dyn Clock) -> CandidateProfile {
    let mut profile = oily_user().with_skin_type(SkinType::Dry);
    CandidateProfile::from_profile(
        &mut profile,
        None,
        clock,
        vec![EffectiveProduct::new(cream(), 45, 0.7)],
    )
}

/// Older, dry, different concerns and fragrance habits.
pub fn dry_stranger(clock: &dyn Clock) -> CandidateProfile {
    let mut profile = UserProfile::new(Uuid::new_v4())
        .with_skin_type(SkinType::Dry)
        .with_age_range(AgeRange::Over40)
        .with_concerns(vec![SkinConcern::Dryness, SkinConcern::Aging, SkinConcern::Redness])
        .with_fragrance_tolerance(FragranceTolerance::Love)
        .with_consent(ConsentLevel::Public);
    CandidateProfile::from_profile(
        &mut profile,
        None,
        clock,
        vec![EffectiveProduct::new(cream(), 90, 0.7)],
    )
}

/// Pool repository that counts eligible-profile fetches.
pub struct CountingPool {
    pub inner: InMemoryPoolRepository,
    pub fetches: AtomicUsize,
}

impl CountingPool {
    pub fn new(inner: InMemoryPoolRepository) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolRepository for CountingPool {
    async fn fetch_eligible_profiles(
        &self,
        excluding: Uuid,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_eligible_profiles(excluding, limit).await
    }

    async fn cached_match_records(&self, user: Uuid) -> Result<Vec<MatchRecord>, RepositoryError> {
        self.inner.cached_match_records(user).await
    }

    async fn save_match_records(
        &self,
        matches: &[MatchResult],
        user: Uuid,
        content_hash: u64,
    ) -> Result<(), RepositoryError> {
        self.inner.save_match_records(matches, user, content_hash).await
    }

    async fn delete_expired_match_records(
        &self,
        user: Option<Uuid>,
    ) -> Result<usize, RepositoryError> {
        self.inner.delete_expired_match_records(user).await
    }

    async fn invalidate_match_records(&self, user: Uuid) -> Result<(), RepositoryError> {
        self.inner.invalidate_match_records(user).await
    }
}

/// Pool repository whose every call fails.
pub struct DownPool;

#[async_trait]
impl PoolRepository for DownPool {
    async fn fetch_eligible_profiles(
        &self,
        _excluding: Uuid,
        _limit: usize,
    ) -> Result<Vec<CandidateProfile>, RepositoryError> {
        Err(RepositoryError::unavailable("pool offline"))
    }

    async fn cached_match_records(&self, _user: Uuid) -> Result<Vec<MatchRecord>, RepositoryError> {
        Err(RepositoryError::unavailable("pool offline"))
    }

    async fn save_match_records(
        &self,
        _matches: &[MatchResult],
        _user: Uuid,
        _content_hash: u64,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::unavailable("pool offline"))
    }

    async fn delete_expired_match_records(
        &self,
        _user: Option<Uuid>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::unavailable("pool offline"))
    }

    async fn invalidate_match_records(&self, _user: Uuid) -> Result<(), RepositoryError> {
        Err(RepositoryError::unavailable("pool offline"))
    }
}

/// History store whose every call fails.
pub struct DownHistory;

#[async_trait]
impl HistoryStore for DownHistory {
    async fn ingredient_effect_stats(
        &self,
    ) -> Result<HashMap<String, IngredientEffectStats>, RepositoryError> {
        Err(RepositoryError::unavailable("history offline"))
    }

    async fn has_severe_issue(
        &self,
        _issue: SkinIssue,
        _threshold: u8,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::unavailable("history offline"))
    }

    async fn issue_baseline(&self) -> Result<Option<IssueBaseline>, RepositoryError> {
        Err(RepositoryError::unavailable("history offline"))
    }
}
