use serde::{Deserialize, Serialize};

use crate::types::RecommendError;

/// Factor weights, admission floor and default result size.
///
/// The final score is
/// `twin_weight·f1 + ingredient_weight·f2 + concern_weight·f3 − risk_weight·f4`,
/// clamped to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "RecommendConfig::default_twin_weight")]
    pub twin_weight: f64,
    #[serde(default = "RecommendConfig::default_ingredient_weight")]
    pub ingredient_weight: f64,
    #[serde(default = "RecommendConfig::default_concern_weight")]
    pub concern_weight: f64,
    #[serde(default = "RecommendConfig::default_risk_weight")]
    pub risk_weight: f64,
    /// Products scoring below this are not returned.
    #[serde(default = "RecommendConfig::default_min_score")]
    pub min_score: f64,
    #[serde(default = "RecommendConfig::default_limit")]
    pub limit: usize,
}

impl RecommendConfig {
    pub(crate) fn default_twin_weight() -> f64 {
        0.4
    }

    pub(crate) fn default_ingredient_weight() -> f64 {
        0.3
    }

    pub(crate) fn default_concern_weight() -> f64 {
        0.2
    }

    pub(crate) fn default_risk_weight() -> f64 {
        0.1
    }

    pub(crate) fn default_min_score() -> f64 {
        0.3
    }

    pub(crate) fn default_limit() -> usize {
        10
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), RecommendError> {
        let weights = [
            ("twin_weight", self.twin_weight),
            ("ingredient_weight", self.ingredient_weight),
            ("concern_weight", self.concern_weight),
            ("risk_weight", self.risk_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RecommendError::InvalidConfig(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(RecommendError::InvalidConfig(
                "min_score must be between 0.0 and 1.0".into(),
            ));
        }
        if self.limit == 0 {
            return Err(RecommendError::InvalidConfig(
                "limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            twin_weight: Self::default_twin_weight(),
            ingredient_weight: Self::default_ingredient_weight(),
            concern_weight: Self::default_concern_weight(),
            risk_weight: Self::default_risk_weight(),
            min_score: Self::default_min_score(),
            limit: Self::default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RecommendConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_weight_rejected() {
        let cfg = RecommendConfig {
            risk_weight: -0.1,
            ..RecommendConfig::default()
        };
        let err = cfg.validate().expect_err("config should be invalid");
        match err {
            RecommendError::InvalidConfig(msg) => assert!(msg.contains("risk_weight")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn floor_and_limit_validated() {
        assert!(RecommendConfig::default()
            .with_min_score(1.5)
            .validate()
            .is_err());
        assert!(RecommendConfig::default().with_limit(0).validate().is_err());
    }
}
