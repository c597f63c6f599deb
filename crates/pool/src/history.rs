//! The querying user's own analysis and ingredient history.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fingerprint::{HistorySnapshot, IssueBaseline, SkinIssue};
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// Default score on the 0–10 analysis scale above which an issue is severe.
pub const DEFAULT_SEVERE_THRESHOLD: u8 = 7;

/// Number of most recent analyses averaged into the baseline and checked
/// for severe issues.
pub const RECENT_ANALYSES: usize = 5;

/// Number of most recent exposures per ingredient counted into its stats.
pub const RECENT_EXPOSURES: usize = 20;

/// Outcome reported after using a product containing an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureFeeling {
    Better,
    Same,
    Worse,
}

/// Per-ingredient outcome counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientEffectStats {
    pub ingredient: String,
    pub total_uses: u32,
    pub better: u32,
    pub same: u32,
    pub worse: u32,
}

impl IngredientEffectStats {
    /// `(better - worse) / total`, in [-1, 1]; 0 without any uses.
    pub fn avg_effectiveness(&self) -> f64 {
        if self.total_uses == 0 {
            return 0.0;
        }
        (f64::from(self.better) - f64::from(self.worse)) / f64::from(self.total_uses)
    }
}

/// Per-issue scores of one skin analysis, each on a 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueScores {
    pub spots: u8,
    pub acne: u8,
    pub pores: u8,
    pub wrinkles: u8,
    pub redness: u8,
    pub evenness: u8,
    pub texture: u8,
}

impl IssueScores {
    pub fn score(&self, issue: SkinIssue) -> u8 {
        match issue {
            SkinIssue::Spots => self.spots,
            SkinIssue::Acne => self.acne,
            SkinIssue::Pores => self.pores,
            SkinIssue::Wrinkles => self.wrinkles,
            SkinIssue::Redness => self.redness,
            SkinIssue::Evenness => self.evenness,
            SkinIssue::Texture => self.texture,
        }
    }
}

/// Read access to the querying user's history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Stats keyed by ingredient name, for every ingredient with exposures.
    async fn ingredient_effect_stats(
        &self,
    ) -> Result<HashMap<String, IngredientEffectStats>, RepositoryError>;

    /// Whether any recent analysis scored `issue` above `threshold`.
    async fn has_severe_issue(&self, issue: SkinIssue, threshold: u8)
        -> Result<bool, RepositoryError>;

    /// Average issue scores over recent analyses; `None` without analyses.
    async fn issue_baseline(&self) -> Result<Option<IssueBaseline>, RepositoryError>;
}

#[derive(Debug, Clone)]
struct Exposure {
    feeling: ExposureFeeling,
    at: DateTime<Utc>,
}

/// Lock-guarded in-process history store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    analyses: RwLock<Vec<(DateTime<Utc>, IssueScores)>>,
    exposures: RwLock<HashMap<String, Vec<Exposure>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_analysis(
        &self,
        at: DateTime<Utc>,
        scores: IssueScores,
    ) -> Result<(), RepositoryError> {
        let mut guard = self
            .analyses
            .write()
            .map_err(|_| RepositoryError::Poisoned("analyses"))?;
        guard.push((at, scores));
        guard.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(())
    }

    pub fn record_exposure(
        &self,
        ingredient: impl Into<String>,
        feeling: ExposureFeeling,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self
            .exposures
            .write()
            .map_err(|_| RepositoryError::Poisoned("exposures"))?;
        let list = guard.entry(ingredient.into()).or_default();
        list.push(Exposure { feeling, at });
        list.sort_by(|a, b| b.at.cmp(&a.at));
        Ok(())
    }

    fn recent_analyses(&self) -> Result<Vec<IssueScores>, RepositoryError> {
        Ok(self
            .analyses
            .read()
            .map_err(|_| RepositoryError::Poisoned("analyses"))?
            .iter()
            .take(RECENT_ANALYSES)
            .map(|(_, scores)| *scores)
            .collect())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn ingredient_effect_stats(
        &self,
    ) -> Result<HashMap<String, IngredientEffectStats>, RepositoryError> {
        let guard = self
            .exposures
            .read()
            .map_err(|_| RepositoryError::Poisoned("exposures"))?;

        Ok(guard
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, list)| {
                let recent = &list[..list.len().min(RECENT_EXPOSURES)];
                let count =
                    |f: ExposureFeeling| recent.iter().filter(|e| e.feeling == f).count() as u32;
                let stats = IngredientEffectStats {
                    ingredient: name.clone(),
                    total_uses: recent.len() as u32,
                    better: count(ExposureFeeling::Better),
                    same: count(ExposureFeeling::Same),
                    worse: count(ExposureFeeling::Worse),
                };
                (name.clone(), stats)
            })
            .collect())
    }

    async fn has_severe_issue(
        &self,
        issue: SkinIssue,
        threshold: u8,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .recent_analyses()?
            .iter()
            .any(|scores| scores.score(issue) > threshold))
    }

    async fn issue_baseline(&self) -> Result<Option<IssueBaseline>, RepositoryError> {
        let recent = self.recent_analyses()?;
        if recent.is_empty() {
            return Ok(None);
        }
        let n = recent.len() as f64;
        let avg = |f: fn(&IssueScores) -> u8| {
            recent.iter().map(|s| f64::from(f(s))).sum::<f64>() / n
        };
        Ok(Some(IssueBaseline {
            spots: avg(|s| s.spots),
            acne: avg(|s| s.acne),
            pores: avg(|s| s.pores),
            wrinkles: avg(|s| s.wrinkles),
            redness: avg(|s| s.redness),
        }))
    }
}

/// Gather the fingerprint inputs held by a history store.
pub async fn history_snapshot(
    store: &dyn HistoryStore,
) -> Result<HistorySnapshot, RepositoryError> {
    Ok(HistorySnapshot {
        baseline: store.issue_baseline().await?,
        severe_redness: store
            .has_severe_issue(SkinIssue::Redness, DEFAULT_SEVERE_THRESHOLD)
            .await?,
        severe_acne: store
            .has_severe_issue(SkinIssue::Acne, DEFAULT_SEVERE_THRESHOLD)
            .await?,
    })
}
