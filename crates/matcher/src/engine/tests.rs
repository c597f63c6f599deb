use super::*;

use chrono::Duration;
use fingerprint::{
    AgeRange, AnonymousProfile, BudgetLevel, ConsentLevel, EffectiveProduct, FragranceTolerance,
    ManualClock, Product, ProductCategory, SkinConcern, SkinType, UvExposure,
};
use uuid::Uuid;

fn oily_query() -> Fingerprint {
    Fingerprint::new(
        SkinType::Oily,
        AgeRange::Age25To30,
        vec![SkinConcern::Acne, SkinConcern::Pores, SkinConcern::Oiliness],
        vec![0.6, 0.7, 0.6, 0.3, 0.4],
        FragranceTolerance::Neutral,
        UvExposure::High,
        0.3,
        BudgetLevel::Moderate,
    )
}

const FRAGRANCES: [FragranceTolerance; 4] = [
    FragranceTolerance::Love,
    FragranceTolerance::Neutral,
    FragranceTolerance::Sensitive,
    FragranceTolerance::Avoid,
];
const UV: [UvExposure; 4] = [
    UvExposure::Low,
    UvExposure::Medium,
    UvExposure::High,
    UvExposure::VeryHigh,
];
const BUDGETS: [BudgetLevel; 5] = [
    BudgetLevel::Economy,
    BudgetLevel::Moderate,
    BudgetLevel::Premium,
    BudgetLevel::Luxury,
    BudgetLevel::NoBudget,
];

/// Fingerprint derived from the bits of a multiplicative hash of `n`, so a
/// given index always yields the same profile.
fn varied_fingerprint(n: u64) -> Fingerprint {
    let h = n.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let pick = |shift: u32, len: usize| ((h >> shift) % len as u64) as usize;
    let unit = |k: u32| ((h.rotate_left(k * 9) >> 24) % 1000) as f64 / 1000.0;

    let concerns: Vec<SkinConcern> = SkinConcern::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| (h >> (40 + i)) & 0b11 == 0)
        .map(|(_, c)| *c)
        .collect();
    Fingerprint::new(
        SkinType::ALL[pick(0, SkinType::ALL.len())],
        AgeRange::ALL[pick(4, AgeRange::ALL.len())],
        concerns,
        (1..=5).map(unit).collect(),
        FRAGRANCES[pick(8, FRAGRANCES.len())],
        UV[pick(12, UV.len())],
        unit(6),
        BUDGETS[pick(16, BUDGETS.len())],
    )
}

fn candidate(id: Uuid, fp: Option<Fingerprint>) -> CandidateProfile {
    let anonymous = AnonymousProfile {
        skin_type: fp.as_ref().map(|f| f.skin_type).unwrap_or(SkinType::Combination),
        age_range: fp.as_ref().map(|f| f.age_range).unwrap_or_default(),
        main_concerns: fp
            .as_ref()
            .map(|f| f.concerns.iter().take(3).copied().collect())
            .unwrap_or_default(),
        issue_vector: vec![0.5; 7],
        region: Some("Zhejiang".into()),
    };
    CandidateProfile {
        id,
        consent: ConsentLevel::Anonymous,
        fingerprint: fp,
        anonymous,
        updated_at: Utc::now(),
        effective_products: vec![EffectiveProduct::new(
            Product::new("Clay Mask", "Acme", ProductCategory::Mask),
            30,
            0.6,
        )],
    }
}

fn varied_pool(n: usize, seed: u64) -> Vec<CandidateProfile> {
    (0..n)
        .map(|i| {
            let fp = varied_fingerprint(seed * 10_000 + i as u64);
            candidate(Uuid::from_u128(i as u128 + 1), Some(fp))
        })
        .collect()
}

fn fixed_clock_matcher(config: BatchConfig) -> Matcher {
    Matcher::new(config)
        .unwrap()
        .with_clock(Arc::new(ManualClock::starting_now()))
}

#[test]
fn weighted_similarity_is_symmetric_and_bounded() {
    for i in 0..500 {
        let a = varied_fingerprint(2 * i);
        let b = varied_fingerprint(2 * i + 1);
        let ab = weighted_similarity(&a, &b);
        let ba = weighted_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-12, "asymmetric: {ab} vs {ba}");
        assert!((0.0..=1.0).contains(&ab), "out of range: {ab}");
    }
}

#[test]
fn identical_fingerprints_saturate() {
    let q = oily_query();
    assert_eq!(weighted_similarity(&q, &q), 1.0);
}

#[test]
fn malformed_fingerprint_scores_zero() {
    let q = oily_query();
    let mut broken = oily_query();
    broken.issue_vector = vec![0.6, 0.7, 0.6];
    assert_eq!(weighted_similarity(&q, &broken), 0.0);

    let matcher = fixed_clock_matcher(BatchConfig::default().with_min_similarity(0.0));
    let pool = vec![candidate(Uuid::from_u128(1), Some(broken))];
    let results = matcher.find_matches(&q, &pool, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].similarity, 0.0);
}

#[test]
fn skin_type_mismatch_is_penalized() {
    let q = oily_query();
    let mut other = oily_query();
    other.skin_type = SkinType::Dry;
    assert!(weighted_similarity(&q, &other) < weighted_similarity(&q, &q));
}

#[test]
fn chunked_matches_equal_sequential() {
    let matcher = fixed_clock_matcher(BatchConfig::default().with_min_similarity(0.0));
    let query = oily_query();
    for n in [0usize, 1, 50, 1000] {
        let pool = varied_pool(n, 0xC0FFEE + n as u64);
        let parallel = matcher.find_matches(&query, &pool, n.max(1));
        let sequential = matcher.find_matches_sequential(&query, &pool, n.max(1));
        assert_eq!(parallel, sequential, "pool size {n}");
    }
}

#[test]
fn chunked_matches_equal_sequential_on_dedicated_pool() {
    let matcher = fixed_clock_matcher(BatchConfig::default().with_worker_threads(2));
    let query = oily_query();
    let pool = varied_pool(300, 42);
    assert_eq!(
        matcher.find_matches(&query, &pool, 20),
        matcher.find_matches_sequential(&query, &pool, 20)
    );
}

#[test]
fn results_are_ranked_filtered_and_limited() {
    let matcher = fixed_clock_matcher(BatchConfig::default());
    let query = oily_query();
    let pool = varied_pool(400, 7);
    let results = matcher.find_matches(&query, &pool, 20);

    assert!(results.len() <= 20);
    for pair in results.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    for r in &results {
        assert!(r.similarity >= 0.6);
        assert_eq!(r.level, MatchLevel::from_similarity(r.similarity));
    }
}

#[test]
fn ties_break_by_candidate_id() {
    let matcher = fixed_clock_matcher(BatchConfig::default());
    let query = oily_query();
    let pool = vec![
        candidate(Uuid::from_u128(9), Some(oily_query())),
        candidate(Uuid::from_u128(3), Some(oily_query())),
        candidate(Uuid::from_u128(5), Some(oily_query())),
    ];
    let ids: Vec<Uuid> = matcher
        .find_matches(&query, &pool, 10)
        .into_iter()
        .map(|r| r.candidate_id)
        .collect();
    assert_eq!(
        ids,
        vec![Uuid::from_u128(3), Uuid::from_u128(5), Uuid::from_u128(9)]
    );
}

#[test]
fn candidates_without_fingerprint_are_skipped() {
    let matcher = fixed_clock_matcher(BatchConfig::default().with_min_similarity(0.0));
    let pool = vec![
        candidate(Uuid::from_u128(1), None),
        candidate(Uuid::from_u128(2), Some(oily_query())),
    ];
    let results = matcher.find_matches(&oily_query(), &pool, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].candidate_id, Uuid::from_u128(2));
}

#[test]
fn oily_dry_random_scenario() {
    let matcher = fixed_clock_matcher(BatchConfig::default());
    let query = oily_query();

    let oily = Fingerprint::new(
        SkinType::Oily,
        AgeRange::Age25To30,
        vec![SkinConcern::Acne, SkinConcern::Pores, SkinConcern::Oiliness],
        vec![0.55, 0.7, 0.65, 0.3, 0.45],
        FragranceTolerance::Neutral,
        UvExposure::High,
        0.35,
        BudgetLevel::Moderate,
    );
    let dry = Fingerprint::new(
        SkinType::Dry,
        AgeRange::Over40,
        vec![SkinConcern::Dryness, SkinConcern::Aging],
        vec![0.2, 0.1, 0.2, 0.8, 0.3],
        FragranceTolerance::Avoid,
        UvExposure::Low,
        0.8,
        BudgetLevel::Luxury,
    );
    let random = varied_fingerprint(99);

    let oily_id = Uuid::from_u128(1);
    let pool = vec![
        candidate(Uuid::from_u128(2), Some(dry)),
        candidate(oily_id, Some(oily)),
        candidate(Uuid::from_u128(3), Some(random)),
    ];

    let results = matcher.find_matches(&query, &pool, 20);
    assert!((1..=2).contains(&results.len()), "got {}", results.len());
    assert_eq!(results[0].candidate_id, oily_id);
    assert_eq!(results[0].level, MatchLevel::Twin);
    assert!(results.iter().all(|r| r.candidate_id != Uuid::from_u128(2)));
    assert_eq!(results[0].effective_products.len(), 1);
}

#[test]
fn skin_type_penalty_alone_drops_an_identical_profile() {
    let matcher = fixed_clock_matcher(BatchConfig::default());
    let query = Fingerprint::new(
        SkinType::Oily,
        AgeRange::Age25To30,
        vec![SkinConcern::Acne],
        vec![0.6, 0.7, 0.6, 0.3, 0.4],
        FragranceTolerance::Neutral,
        UvExposure::High,
        0.3,
        BudgetLevel::Moderate,
    );
    let mut dry = query.clone();
    dry.skin_type = SkinType::Dry;

    // one-hot skin types are orthogonal, so cosine loses exactly 1/|v|^2
    let norm_sq: f64 = query.vector().iter().map(|x| x * x).sum();
    let expected = 1.0 - 1.0 / norm_sq - 0.3 + 0.1 + 0.03 + 0.05;
    let score = weighted_similarity(&query, &dry);
    assert!((score - expected).abs() < 1e-9, "{score} vs {expected}");
    assert!(score < 0.7);

    let stranger = Fingerprint::new(
        SkinType::Dry,
        AgeRange::Over40,
        vec![SkinConcern::Dryness, SkinConcern::Aging],
        vec![0.2, 0.1, 0.2, 0.8, 0.3],
        FragranceTolerance::Avoid,
        UvExposure::Low,
        0.8,
        BudgetLevel::Luxury,
    );
    let twin_id = Uuid::from_u128(1);
    let dry_id = Uuid::from_u128(2);
    let pool = vec![
        candidate(dry_id, Some(dry)),
        candidate(Uuid::from_u128(3), Some(stranger)),
        candidate(twin_id, Some(query.clone())),
    ];

    let results = matcher.find_matches(&query, &pool, 20);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].candidate_id, twin_id);
    assert_eq!(results[0].level, MatchLevel::Twin);
    assert_eq!(results[1].candidate_id, dry_id);
    assert_eq!(results[1].level, MatchLevel::SomewhatSimilar);
}

#[test]
fn matched_at_comes_from_clock() {
    let clock = Arc::new(ManualClock::starting_now());
    clock.advance(Duration::hours(3));
    let matcher = Matcher::new(BatchConfig::default())
        .unwrap()
        .with_clock(clock.clone());
    let pool = vec![candidate(Uuid::from_u128(1), Some(oily_query()))];
    let results = matcher.find_matches(&oily_query(), &pool, 5);
    assert_eq!(results[0].matched_at, clock.now());
}

#[test]
fn batch_preserves_query_order() {
    let matcher = fixed_clock_matcher(BatchConfig::default().with_max_batch_size(3));
    let pool = varied_pool(120, 3);
    let queries: Vec<Fingerprint> = (0..7).map(|i| varied_fingerprint(11_000 + i)).collect();

    let batched = matcher.find_matches_batch(&queries, &pool, 10).unwrap();
    assert_eq!(batched.len(), queries.len());
    for (q, got) in queries.iter().zip(&batched) {
        assert_eq!(got, &matcher.find_matches_sequential(q, &pool, 10));
    }
}

#[test]
fn batch_edge_cases() {
    let matcher = fixed_clock_matcher(BatchConfig::default());
    let pool = varied_pool(10, 5);
    assert!(matcher.find_matches_batch(&[], &pool, 10).unwrap().is_empty());

    let queries = vec![oily_query(), oily_query()];
    let out = matcher.find_matches_batch(&queries, &[], 10).unwrap();
    assert_eq!(out, vec![Vec::new(), Vec::new()]);
}

#[test]
fn sequential_batch_matches_parallel_batch() {
    let pool = varied_pool(200, 17);
    let queries: Vec<Fingerprint> = (0..12).map(|i| varied_fingerprint(23_000 + i)).collect();

    let parallel = fixed_clock_matcher(BatchConfig::default());
    let sequential = fixed_clock_matcher(BatchConfig::default().with_parallel(false));
    let a = parallel.find_matches_batch(&queries, &pool, 15).unwrap();
    let b = sequential.find_matches_batch(&queries, &pool, 15).unwrap();
    let sims = |rows: &Vec<Vec<MatchResult>>| {
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|m| (m.candidate_id, m.similarity))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(sims(&a), sims(&b));
}

#[test]
fn unavailable_worker_pool_falls_back_to_sequential() {
    let matcher = fixed_clock_matcher(BatchConfig::default().with_worker_threads(4));
    matcher
        .workers
        .set(Err("thread spawn refused".into()))
        .unwrap();

    let pool = varied_pool(60, 8);
    let queries = vec![oily_query()];

    let err = matcher.find_matches_batch(&queries, &pool, 10).unwrap_err();
    assert!(matches!(err, MatchError::WorkerPool(_)));

    let fallback = matcher.find_matches_batch_with_fallback(&queries, &pool, 10);
    assert_eq!(
        fallback,
        vec![matcher.find_matches_sequential(&queries[0], &pool, 10)]
    );
}

#[test]
fn invalid_config_is_rejected() {
    let err = Matcher::new(BatchConfig::default().with_max_batch_size(0))
        .err()
        .expect("config should be invalid");
    assert!(matches!(err, MatchError::InvalidConfig(_)));
}
