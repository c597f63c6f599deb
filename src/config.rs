//! YAML Configuration File Support for SkinTwin
//!
//! Loads the tuning of every stage (matcher, cache, recommendation scoring,
//! candidate pool) from a single YAML file. Every section and every field is
//! optional and falls back to the built-in defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # SkinTwin Configuration
//! version: "1.0"
//! name: "production"
//!
//! matcher:
//!   max_batch_size: 5
//!   min_similarity: 0.6
//!   enable_parallel_processing: true
//!   worker_threads: 4
//!
//! cache:
//!   capacity: 100
//!   ttl_hours: 24
//!
//! recommend:
//!   twin_weight: 0.4
//!   ingredient_weight: 0.3
//!   concern_weight: 0.2
//!   risk_weight: 0.1
//!   min_score: 0.3
//!   limit: 10
//!
//! pool:
//!   candidate_limit: 1000
//!   match_limit: 20
//! ```

use std::fs;
use std::path::Path;

use cache::CacheConfig;
use matcher::{BatchConfig, DEFAULT_MATCH_LIMIT};
use pool::DEFAULT_POOL_LIMIT;
use recommend::RecommendConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for a SkinTwin deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SkinTwinConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub matcher: BatchConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub recommend: RecommendConfig,

    #[serde(default)]
    pub pool: PoolYamlConfig,
}

impl SkinTwinConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SkinTwinConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))?;
        self.cache
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("cache: {e}")))?;
        self.recommend
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("recommend: {e}")))?;
        self.pool.validate()?;

        Ok(())
    }
}

impl Default for SkinTwinConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            matcher: BatchConfig::default(),
            cache: CacheConfig::default(),
            recommend: RecommendConfig::default(),
            pool: PoolYamlConfig::default(),
        }
    }
}

/// Candidate pool YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolYamlConfig {
    /// Most candidate profiles fetched per match run.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Most matches kept per user.
    #[serde(default = "default_match_limit")]
    pub match_limit: usize,
}

impl PoolYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.candidate_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "pool.candidate_limit must be >= 1".to_string(),
            ));
        }
        if self.match_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "pool.match_limit must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PoolYamlConfig {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            match_limit: default_match_limit(),
        }
    }
}

fn default_candidate_limit() -> usize {
    DEFAULT_POOL_LIMIT
}
fn default_match_limit() -> usize {
    DEFAULT_MATCH_LIMIT
}
