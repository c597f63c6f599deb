//! Closed attribute vocabularies used by skin fingerprints.
//!
//! Every enum exposes `ALL` in its canonical encoding order. Vectorization
//! depends on that order, so variants must only ever be appended.

use serde::{Deserialize, Serialize};

/// Skin-type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
}

impl SkinType {
    pub const ALL: [SkinType; 4] = [
        SkinType::Dry,
        SkinType::Oily,
        SkinType::Combination,
        SkinType::Sensitive,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combination => "combination",
            SkinType::Sensitive => "sensitive",
        }
    }
}

/// Five-year age bracket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AgeRange {
    Under20,
    Age20To25,
    #[default]
    Age25To30,
    Age30To35,
    Age35To40,
    Over40,
}

impl AgeRange {
    pub const ALL: [AgeRange; 6] = [
        AgeRange::Under20,
        AgeRange::Age20To25,
        AgeRange::Age25To30,
        AgeRange::Age30To35,
        AgeRange::Age35To40,
        AgeRange::Over40,
    ];

    /// Position of the bracket on a [0, 1] scale.
    pub fn normalized(self) -> f64 {
        match self {
            AgeRange::Under20 => 0.1,
            AgeRange::Age20To25 => 0.25,
            AgeRange::Age25To30 => 0.4,
            AgeRange::Age30To35 => 0.55,
            AgeRange::Age35To40 => 0.7,
            AgeRange::Over40 => 0.85,
        }
    }
}

/// Concern tag a user can list on their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinConcern {
    Acne,
    Aging,
    Dryness,
    Oiliness,
    Sensitivity,
    Pigmentation,
    Pores,
    Redness,
}

impl SkinConcern {
    pub const ALL: [SkinConcern; 8] = [
        SkinConcern::Acne,
        SkinConcern::Aging,
        SkinConcern::Dryness,
        SkinConcern::Oiliness,
        SkinConcern::Sensitivity,
        SkinConcern::Pigmentation,
        SkinConcern::Pores,
        SkinConcern::Redness,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SkinConcern::Acne => "acne",
            SkinConcern::Aging => "aging",
            SkinConcern::Dryness => "dryness",
            SkinConcern::Oiliness => "oiliness",
            SkinConcern::Sensitivity => "sensitivity",
            SkinConcern::Pigmentation => "pigmentation",
            SkinConcern::Pores => "pores",
            SkinConcern::Redness => "redness",
        }
    }
}

/// How well the user tolerates fragranced products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FragranceTolerance {
    Love,
    #[default]
    Neutral,
    Sensitive,
    Avoid,
}

impl FragranceTolerance {
    pub fn normalized(self) -> f64 {
        match self {
            FragranceTolerance::Love => 1.0,
            FragranceTolerance::Neutral => 0.5,
            FragranceTolerance::Sensitive => 0.25,
            FragranceTolerance::Avoid => 0.0,
        }
    }
}

/// Typical daily UV exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UvExposure {
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl UvExposure {
    pub fn normalized(self) -> f64 {
        match self {
            UvExposure::Low => 0.25,
            UvExposure::Medium => 0.5,
            UvExposure::High => 0.75,
            UvExposure::VeryHigh => 1.0,
        }
    }
}

/// Spending tier per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Economy,
    #[default]
    Moderate,
    Premium,
    Luxury,
    NoBudget,
}

impl BudgetLevel {
    pub fn normalized(self) -> f64 {
        match self {
            BudgetLevel::Economy => 0.2,
            BudgetLevel::Moderate => 0.4,
            BudgetLevel::Premium => 0.6,
            BudgetLevel::Luxury => 0.8,
            BudgetLevel::NoBudget => 1.0,
        }
    }
}

/// Community participation level. Anything but `None` opts into matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsentLevel {
    #[default]
    None,
    Anonymous,
    Pseudonymous,
    Public,
}

impl ConsentLevel {
    pub fn allows_matching(self) -> bool {
        self != ConsentLevel::None
    }
}

/// Issue dimensions scored by skin analyses on a 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinIssue {
    Spots,
    Acne,
    Pores,
    Wrinkles,
    Redness,
    Evenness,
    Texture,
}
