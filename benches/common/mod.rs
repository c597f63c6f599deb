//! Common utilities for SkinTwin benchmarks
//!
//! Deterministic pool generation so runs are comparable.

#![allow(dead_code)]

use chrono::Utc;
use skintwin::{
    AgeRange, AnonymousProfile, BudgetLevel, CandidateProfile, ConsentLevel, EffectiveProduct,
    Fingerprint, FragranceTolerance, Ingredient, IngredientFunction, Product, ProductCategory,
    SkinConcern, SkinType, UvExposure,
};
use uuid::Uuid;

/// xorshift64; enough spread for synthetic pools.
pub struct Rng(pub u64);

impl Rng {
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn unit(&mut self) -> f64 {
        (self.next_u64() % 10_000) as f64 / 10_000.0
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    pub fn pick_product(&mut self, products: &[Product]) -> Product {
        products[(self.next_u64() % products.len() as u64) as usize].clone()
    }
}

pub fn random_fingerprint(rng: &mut Rng) -> Fingerprint {
    let concerns: Vec<SkinConcern> = SkinConcern::ALL
        .iter()
        .copied()
        .filter(|_| rng.next_u64() % 3 == 0)
        .collect();
    Fingerprint::new(
        rng.pick(&SkinType::ALL),
        rng.pick(&AgeRange::ALL),
        concerns,
        (0..5).map(|_| rng.unit()).collect(),
        rng.pick(&[
            FragranceTolerance::Love,
            FragranceTolerance::Neutral,
            FragranceTolerance::Sensitive,
            FragranceTolerance::Avoid,
        ]),
        rng.pick(&[UvExposure::Low, UvExposure::Medium, UvExposure::High]),
        rng.unit(),
        rng.pick(&[BudgetLevel::Economy, BudgetLevel::Moderate, BudgetLevel::Premium]),
    )
}

/// A small catalogue shared by every generated candidate.
pub fn catalogue() -> Vec<Product> {
    let functions = [
        IngredientFunction::AcneFighting,
        IngredientFunction::Moisturizing,
        IngredientFunction::Soothing,
        IngredientFunction::Brightening,
        IngredientFunction::AntiAging,
    ];
    (0..12)
        .map(|i| {
            Product::new(format!("Product {i}"), "Bench", ProductCategory::Serum)
                .with_ingredients(vec![Ingredient::new(
                    format!("Active {i}"),
                    functions[i % functions.len()],
                )])
                .with_skin_types(vec![SkinType::ALL[i % SkinType::ALL.len()]])
                .with_concerns(vec![SkinConcern::ALL[i % SkinConcern::ALL.len()]])
        })
        .collect()
}

pub fn random_pool(n: usize, seed: u64) -> Vec<CandidateProfile> {
    let mut rng = Rng(seed);
    let products = catalogue();
    (0..n)
        .map(|i| {
            let fp = random_fingerprint(&mut rng);
            let effective = (0..2)
                .map(|_| EffectiveProduct::new(rng.pick_product(&products), 30, rng.unit()))
                .collect();
            CandidateProfile {
                id: Uuid::from_u128(i as u128 + 1),
                consent: ConsentLevel::Anonymous,
                anonymous: AnonymousProfile {
                    skin_type: fp.skin_type,
                    age_range: fp.age_range,
                    main_concerns: fp.concerns.iter().take(3).copied().collect(),
                    issue_vector: vec![0.5; 7],
                    region: None,
                },
                fingerprint: Some(fp),
                updated_at: Utc::now(),
                effective_products: effective,
            }
        })
        .collect()
}
