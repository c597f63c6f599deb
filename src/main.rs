//! SkinTwin demo: seeds an in-memory pool, matches one user against it and
//! prints the report twice to show the memory cache taking over.
//!
//! Usage: `skintwin [config.yaml]`. Log level follows `RUST_LOG`; set
//! `SKINTWIN_LOG_JSON=1` for JSON output.

use std::error::Error;
use std::sync::Arc;

use chrono::{Duration, Utc};
use skintwin::{
    AgeRange, CandidateProfile, ConsentLevel, EffectiveProduct, ExposureFeeling,
    FragranceTolerance, InMemoryHistoryStore, InMemoryPoolRepository, Ingredient,
    IngredientFunction, IrritationLevel, IssueScores, Product, ProductCategory, SkinConcern,
    SkinTwinConfig, SkinType, SystemClock, TwinReport, TwinService, UserProfile,
};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => SkinTwinConfig::from_file(path)?,
        None => SkinTwinConfig::default(),
    };

    let pool = Arc::new(InMemoryPoolRepository::new());
    seed_pool(&pool)?;

    let history = Arc::new(InMemoryHistoryStore::new());
    let now = Utc::now();
    history.record_analysis(
        now - Duration::days(2),
        IssueScores {
            spots: 3,
            acne: 6,
            pores: 7,
            wrinkles: 2,
            redness: 3,
            evenness: 4,
            texture: 5,
        },
    )?;
    history.record_exposure("Niacinamide", ExposureFeeling::Better, now - Duration::days(1))?;

    let service = TwinService::new(&config, pool, history)?;

    let mut me = UserProfile::new(Uuid::new_v4())
        .with_skin_type(SkinType::Oily)
        .with_age_range(AgeRange::Age25To30)
        .with_concerns(vec![SkinConcern::Acne, SkinConcern::Pores])
        .with_consent(ConsentLevel::Anonymous);

    let report = service.load_matches(&mut me, false).await?;
    print_report(&report);

    let again = service.load_matches(&mut me, false).await?;
    println!("second lookup served from {:?}", again.source);

    let stats = service.cache_stats()?;
    println!(
        "cache: {} entries, avg age {}, ~{}",
        stats.total_entries,
        stats.formatted_average_age(),
        stats.formatted_memory()
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var_os("SKINTWIN_LOG_JSON").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

fn seed_pool(pool: &InMemoryPoolRepository) -> Result<(), Box<dyn Error>> {
    let clock = SystemClock;

    let serum = Product::new("Clear Pore Serum", "Lumen", ProductCategory::Serum)
        .with_ingredients(vec![
            Ingredient::new("Niacinamide", IngredientFunction::AcneFighting),
            Ingredient::new("Salicylic Acid", IngredientFunction::Exfoliating)
                .with_risk(IrritationLevel::Medium),
        ])
        .with_skin_types(vec![SkinType::Oily, SkinType::Combination])
        .with_concerns(vec![SkinConcern::Acne, SkinConcern::Pores]);
    let cream = Product::new("Barrier Cream", "Lumen", ProductCategory::Moisturizer)
        .with_ingredients(vec![Ingredient::new(
            "Ceramide NP",
            IngredientFunction::Moisturizing,
        )])
        .with_skin_types(vec![SkinType::Dry])
        .with_concerns(vec![SkinConcern::Dryness]);

    let seeds = [
        (
            SkinType::Oily,
            vec![SkinConcern::Acne, SkinConcern::Pores],
            vec![EffectiveProduct::new(serum.clone(), 60, 0.8)],
        ),
        (
            SkinType::Combination,
            vec![SkinConcern::Acne, SkinConcern::Oiliness],
            vec![EffectiveProduct::new(serum, 45, 0.6)],
        ),
        (
            SkinType::Dry,
            vec![SkinConcern::Dryness, SkinConcern::Aging],
            vec![EffectiveProduct::new(cream, 90, 0.7)],
        ),
    ];

    for (skin_type, concerns, effective) in seeds {
        let mut profile = UserProfile::new(Uuid::new_v4())
            .with_skin_type(skin_type)
            .with_age_range(AgeRange::Age25To30)
            .with_concerns(concerns)
            .with_fragrance_tolerance(FragranceTolerance::Neutral)
            .with_consent(ConsentLevel::Anonymous);
        pool.upsert_profile(CandidateProfile::from_profile(
            &mut profile,
            None,
            &clock,
            effective,
        ))?;
    }
    Ok(())
}

fn print_report(report: &TwinReport) {
    println!(
        "{} matches ({:?}), average similarity {:.2}",
        report.matches.len(),
        report.source,
        report.stats.average_similarity
    );
    for m in &report.matches {
        println!(
            "  {} {}% {} skin",
            m.level.display_name(),
            m.similarity_percent(),
            m.profile.skin_type.display_name()
        );
    }
    for rec in &report.recommendations {
        println!(
            "  -> {} ({}%, {})",
            rec.product.name,
            rec.score_percent(),
            rec.level().display_name()
        );
        for reason in &rec.reasons {
            println!("     {reason}");
        }
    }
}
