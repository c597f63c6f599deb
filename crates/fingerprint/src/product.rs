//! Product catalogue types shared by matching and recommendation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SkinConcern, SkinType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Cleanser,
    Toner,
    Serum,
    Moisturizer,
    Sunscreen,
    Mask,
    Exfoliant,
    EyeCream,
}

/// Primary function of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientFunction {
    Moisturizing,
    AntiAging,
    Brightening,
    AcneFighting,
    Soothing,
    Exfoliating,
    SunProtection,
    Preservative,
    Fragrance,
    Other,
}

impl IngredientFunction {
    /// Function an ingredient needs to address a concern.
    pub fn for_concern(concern: SkinConcern) -> Self {
        match concern {
            SkinConcern::Acne => IngredientFunction::AcneFighting,
            SkinConcern::Aging => IngredientFunction::AntiAging,
            SkinConcern::Dryness => IngredientFunction::Moisturizing,
            // oil control has no dedicated function class
            SkinConcern::Oiliness => IngredientFunction::Other,
            SkinConcern::Sensitivity => IngredientFunction::Soothing,
            SkinConcern::Pigmentation => IngredientFunction::Brightening,
            SkinConcern::Pores => IngredientFunction::Exfoliating,
            SkinConcern::Redness => IngredientFunction::Soothing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IrritationLevel {
    None,
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub function: IngredientFunction,
    #[serde(default)]
    pub irritation_risk: IrritationLevel,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, function: IngredientFunction) -> Self {
        Self {
            name: name.into(),
            function,
            irritation_risk: IrritationLevel::Low,
        }
    }

    pub fn with_risk(mut self, risk: IrritationLevel) -> Self {
        self.irritation_risk = risk;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: ProductCategory,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Skin types the product is formulated for; empty means unrestricted.
    #[serde(default)]
    pub skin_types: Vec<SkinType>,
    #[serde(default)]
    pub concerns: Vec<SkinConcern>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        category: ProductCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            category,
            ingredients: Vec::new(),
            skin_types: Vec::new(),
            concerns: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_skin_types(mut self, skin_types: Vec<SkinType>) -> Self {
        self.skin_types = skin_types;
        self
    }

    pub fn with_concerns(mut self, concerns: Vec<SkinConcern>) -> Self {
        self.concerns = concerns;
        self
    }

    pub fn has_fragrance(&self) -> bool {
        self.ingredients
            .iter()
            .any(|i| i.function == IngredientFunction::Fragrance)
    }
}

/// How effective a product was for one community member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveProduct {
    pub product: Product,
    /// Days the product was used.
    pub usage_days: u32,
    /// Measured improvement in [0, 1].
    pub improvement: f64,
}

impl EffectiveProduct {
    pub fn new(product: Product, usage_days: u32, improvement: f64) -> Self {
        Self {
            product,
            usage_days,
            improvement: improvement.clamp(0.0, 1.0),
        }
    }
}
