//! Pure scoring factors for a single product.

use std::collections::HashMap;

use fingerprint::{
    Fingerprint, FragranceTolerance, IngredientFunction, IrritationLevel, Product, SkinConcern,
    SkinType,
};
use matcher::MatchResult;
use pool::IngredientEffectStats;

use crate::config::RecommendConfig;
use crate::types::{Evidence, RecommendationScore};

const INGREDIENT_BASELINE: f64 = 0.5;
const SKIN_TYPE_TARGETED: f64 = 0.3;
const SKIN_TYPE_EXCLUDED: f64 = 0.2;
const CONCERN_FUNCTION_BONUS: f64 = 0.1;
const HISTORY_EFFECT_WEIGHT: f64 = 0.2;

const NO_CONCERNS_MATCH: f64 = 0.5;
const TOP_CONCERN_BONUS: f64 = 0.15;
const TOP_CONCERNS: usize = 2;

const HIGH_RISK: f64 = 0.3;
const MEDIUM_RISK: f64 = 0.1;
const SENSITIVE_MULTIPLIER: f64 = 1.5;
const IRRITATION_MULTIPLIER: f64 = 1.3;
const IRRITATION_HISTORY_THRESHOLD: f64 = 0.5;
const NEGATIVE_EFFECT_THRESHOLD: f64 = -0.3;
const NEGATIVE_EFFECT_RISK: f64 = 0.5;

const INGREDIENT_REASON_THRESHOLD: f64 = 0.7;
const CONCERN_REASON_THRESHOLD: f64 = 0.7;
const RISK_REASON_THRESHOLD: f64 = 0.3;

/// Similarity-weighted average improvement over the matches that used the
/// product, plus the evidence behind it.
pub fn twin_effectiveness(product: &Product, matches: &[MatchResult]) -> (f64, Evidence) {
    let mut count = 0usize;
    let mut total_weight = 0.0;
    let mut weighted_improvement = 0.0;
    let mut similarity_sum = 0.0;
    let mut usage_days: u64 = 0;

    for m in matches {
        let Some(used) = m
            .effective_products
            .iter()
            .find(|e| e.product.id == product.id)
        else {
            continue;
        };
        count += 1;
        total_weight += m.similarity;
        weighted_improvement += m.similarity * used.improvement;
        similarity_sum += m.similarity;
        usage_days += u64::from(used.usage_days);
    }

    if count == 0 {
        return (0.0, Evidence::default());
    }

    let avg_improvement = if total_weight > 0.0 {
        weighted_improvement / total_weight
    } else {
        0.0
    };
    let evidence = Evidence {
        effective_user_count: count,
        avg_similarity: similarity_sum / count as f64,
        avg_improvement,
        avg_usage_days: (usage_days / count as u64) as u32,
    };
    (avg_improvement, evidence)
}

/// How well the product's formulation suits the user, in [0, 1].
pub fn ingredient_match(
    product: &Product,
    user: &Fingerprint,
    stats: &HashMap<String, IngredientEffectStats>,
) -> f64 {
    let mut score = INGREDIENT_BASELINE;
    let mut factors = 1.0_f64;

    if product.skin_types.contains(&user.skin_type) {
        score += SKIN_TYPE_TARGETED;
        factors += 1.0;
    } else if !product.skin_types.is_empty() {
        score -= SKIN_TYPE_EXCLUDED;
    }

    for concern in &user.concerns {
        let wanted = IngredientFunction::for_concern(*concern);
        if product.ingredients.iter().any(|i| i.function == wanted) {
            score += CONCERN_FUNCTION_BONUS;
            factors += 1.0;
        }
    }

    if product.has_fragrance() {
        score += match user.fragrance_tolerance {
            FragranceTolerance::Avoid => -0.4,
            FragranceTolerance::Sensitive => -0.2,
            FragranceTolerance::Neutral => 0.0,
            FragranceTolerance::Love => 0.1,
        };
        factors += 1.0;
    }

    for ingredient in &product.ingredients {
        if let Some(s) = stats.get(&ingredient.name) {
            score += s.avg_effectiveness() * HISTORY_EFFECT_WEIGHT;
            factors += 1.0;
        }
    }

    (score / factors * factors.sqrt()).clamp(0.0, 1.0)
}

/// Overlap between the user's concerns and the product's targets, in [0, 1].
pub fn concern_match(product: &Product, user: &Fingerprint) -> f64 {
    if user.concerns.is_empty() {
        return NO_CONCERNS_MATCH;
    }

    let shared = user
        .concerns
        .iter()
        .filter(|c| product.concerns.contains(c))
        .count();
    let mut score = shared as f64 / user.concerns.len() as f64;

    score += user
        .concerns
        .iter()
        .take(TOP_CONCERNS)
        .filter(|c| product.concerns.contains(c))
        .count() as f64
        * TOP_CONCERN_BONUS;

    score.min(1.0)
}

/// Irritation risk of the product for this user, in [0, 1].
///
/// Multipliers stack on the raw ingredient risk; the result is clamped once
/// after every adjustment.
pub fn risk_penalty(
    product: &Product,
    user: &Fingerprint,
    stats: &HashMap<String, IngredientEffectStats>,
) -> f64 {
    let mut risk: f64 = product
        .ingredients
        .iter()
        .map(|i| match i.irritation_risk {
            IrritationLevel::High => HIGH_RISK,
            IrritationLevel::Medium => MEDIUM_RISK,
            IrritationLevel::Low | IrritationLevel::None => 0.0,
        })
        .sum();

    if user.skin_type == SkinType::Sensitive || user.concerns.contains(&SkinConcern::Sensitivity) {
        risk *= SENSITIVE_MULTIPLIER;
    }
    if user.irritation_history > IRRITATION_HISTORY_THRESHOLD {
        risk *= IRRITATION_MULTIPLIER;
    }

    for ingredient in &product.ingredients {
        if stats
            .get(&ingredient.name)
            .is_some_and(|s| s.avg_effectiveness() < NEGATIVE_EFFECT_THRESHOLD)
        {
            risk += NEGATIVE_EFFECT_RISK;
        }
    }

    risk.clamp(0.0, 1.0)
}

/// Score one product against the matches that may have used it.
///
/// Returns `None` when the final score falls below the admission floor.
pub fn score_product(
    product: &Product,
    user: &Fingerprint,
    matches: &[MatchResult],
    stats: &HashMap<String, IngredientEffectStats>,
    config: &RecommendConfig,
) -> Option<RecommendationScore> {
    let mut reasons = Vec::new();

    let (effectiveness, evidence) = twin_effectiveness(product, matches);
    if evidence.effective_user_count > 0 {
        reasons.push(format!(
            "{} similar users found it effective, average improvement {}%",
            evidence.effective_user_count,
            (evidence.avg_improvement * 100.0) as u32
        ));
    }

    let ingredients = ingredient_match(product, user, stats);
    if ingredients > INGREDIENT_REASON_THRESHOLD {
        reasons.push(format!(
            "Ingredients suit your {} skin",
            user.skin_type.display_name()
        ));
    }

    let concerns = concern_match(product, user);
    if concerns > CONCERN_REASON_THRESHOLD {
        let top: Vec<&str> = user
            .concerns
            .iter()
            .take(TOP_CONCERNS)
            .map(|c| c.display_name())
            .collect();
        if !top.is_empty() {
            reasons.push(format!("Targets {}", top.join(", ")));
        }
    }

    let risk = risk_penalty(product, user, stats);
    if risk > RISK_REASON_THRESHOLD {
        reasons.push("Some ingredients may irritate, patch test first".to_string());
    }

    let score = (config.twin_weight * effectiveness
        + config.ingredient_weight * ingredients
        + config.concern_weight * concerns
        - config.risk_weight * risk)
        .clamp(0.0, 1.0);

    if score < config.min_score {
        return None;
    }

    Some(RecommendationScore {
        product: product.clone(),
        score,
        reasons,
        evidence,
    })
}
