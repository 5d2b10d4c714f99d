// Integration tests for the matching pipeline

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use crosspromo_match::core::{BatchMatcher, FixedClock, Matcher, MatchingError, WeightPolicy};
use crosspromo_match::models::{
    BatchEntry, BatchRequest, CriteriaOverride, GeographicTarget, MatchingAlgorithmInput,
    MatchingAlgorithmResult, Newsletter, NumericRange, RecommendationMatchingCriteria,
    TargetAudience,
};

fn create_test_newsletter(
    id: &str,
    org: &str,
    subscribers: u64,
    categories: &[&str],
    open_rate: f64,
) -> Newsletter {
    Newsletter {
        id: id.to_string(),
        organization_id: org.to_string(),
        title: format!("Newsletter {}", id),
        description: None,
        client_id: None,
        subscriber_count: subscribers,
        categories: categories.iter().map(|c| c.to_string()).collect(),
        average_open_rate: open_rate,
        is_active_for_recommendations: true,
        recommendation_weight: None,
        target_audience: None,
        created_at: None,
        updated_at: None,
    }
}

fn audience(min_age: f64, max_age: f64, interests: &[&str], country: &str, region: &str) -> TargetAudience {
    TargetAudience {
        age_range: Some(NumericRange::new(min_age, max_age)),
        income_range: None,
        interests: Some(interests.iter().map(|s| s.to_string()).collect()),
        geographic: Some(GeographicTarget {
            country: Some(country.to_string()),
            region: Some(region.to_string()),
        }),
    }
}

fn create_source() -> Newsletter {
    let mut source = create_test_newsletter("source-1", "org-1", 10_000, &["Technology", "Programming", "AI"], 25.5);
    source.target_audience = Some(audience(25.0, 45.0, &["technology", "programming"], "US", "West Coast"));
    source
}

fn create_pool() -> Vec<Newsletter> {
    let mut startup = create_test_newsletter("candidate-1", "org-2", 8_000, &["Technology", "Startups", "Business"], 22.0);
    startup.target_audience = Some(audience(30.0, 50.0, &["startups", "business"], "US", "West Coast"));

    let mut design = create_test_newsletter("candidate-2", "org-3", 5_000, &["Design", "UX", "Creative"], 30.0);
    design.target_audience = Some(audience(22.0, 40.0, &["design", "creativity"], "US", "East Coast"));

    let same_org = create_test_newsletter("candidate-3", "org-1", 3_000, &["Technology", "Programming"], 20.0);

    let mut inactive = create_test_newsletter("candidate-4", "org-4", 12_000, &["Technology"], 28.0);
    inactive.is_active_for_recommendations = false;

    let small = create_test_newsletter("candidate-5", "org-5", 500, &["Technology"], 35.0);

    vec![startup, design, same_org, inactive, small]
}

fn create_matcher() -> Matcher {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    Matcher::with_default_criteria().with_clock(Arc::new(FixedClock(now)))
}

fn criteria_with_min(min_match_score: f64) -> RecommendationMatchingCriteria {
    RecommendationMatchingCriteria {
        min_match_score,
        ..Default::default()
    }
}

fn ranking(result: &MatchingAlgorithmResult) -> Vec<(String, f64)> {
    result
        .matches
        .iter()
        .map(|m| (m.to_newsletter_id.clone(), m.match_score))
        .collect()
}

#[test]
fn test_filters_remove_ineligible_candidates() {
    let matcher = create_matcher();
    let input = MatchingAlgorithmInput::new(create_source(), create_pool(), criteria_with_min(0.0));

    let result = matcher.find_matches(&input).unwrap();

    assert_eq!(result.total_candidates, 2);
    let ids: Vec<&str> = result.matches.iter().map(|m| m.to_newsletter_id.as_str()).collect();
    assert!(!ids.contains(&"candidate-3"), "same organization must be excluded");
    assert!(!ids.contains(&"candidate-4"), "inactive must be excluded");
    assert!(!ids.contains(&"candidate-5"), "too small must be excluded");
}

#[test]
fn test_excluded_organizations() {
    let matcher = create_matcher();
    let input = MatchingAlgorithmInput::new(create_source(), create_pool(), criteria_with_min(0.0))
        .excluding_organizations(["org-2"]);

    let result = matcher.find_matches(&input).unwrap();

    assert_eq!(result.total_candidates, 1);
    assert!(result.matches.iter().all(|m| m.to_newsletter_id != "candidate-1"));
}

#[test]
fn test_included_categories() {
    let matcher = create_matcher();
    let pool = create_pool();
    let input = MatchingAlgorithmInput::new(create_source(), pool.clone(), criteria_with_min(0.0))
        .including_categories(["Technology"]);

    let result = matcher.find_matches(&input).unwrap();

    assert!(!result.matches.is_empty());
    for m in &result.matches {
        let candidate = pool.iter().find(|c| c.id == m.to_newsletter_id).unwrap();
        assert!(candidate.categories.contains("Technology"));
    }
}

#[test]
fn test_matches_sorted_and_above_threshold() {
    let matcher = create_matcher();

    for min in [0.0, 30.0, 50.0, 70.0] {
        let input = MatchingAlgorithmInput::new(create_source(), create_pool(), criteria_with_min(min));
        let result = matcher.find_matches(&input).unwrap();

        for m in &result.matches {
            assert!(m.match_score >= min, "Score {} below threshold {}", m.match_score, min);
            assert!(m.match_score <= 100.0);
        }
        for i in 1..result.matches.len() {
            assert!(
                result.matches[i - 1].match_score >= result.matches[i].match_score,
                "Matches not sorted by score"
            );
        }
    }
}

#[test]
fn test_max_suggestions_enforced() {
    let matcher = create_matcher();
    let pool: Vec<Newsletter> = (0..50)
        .map(|i| create_test_newsletter(&format!("c{}", i), &format!("org-x{}", i), 5_000 + i * 100, &["Technology"], 20.0 + (i % 7) as f64))
        .collect();
    let criteria = RecommendationMatchingCriteria {
        max_suggestions: 10,
        min_match_score: 0.0,
        ..Default::default()
    };

    let result = matcher
        .find_matches(&MatchingAlgorithmInput::new(create_source(), pool, criteria))
        .unwrap();

    assert_eq!(result.total_candidates, 50);
    assert_eq!(result.matches.len(), 10, "Should not exceed limit of 10");
}

#[test]
fn test_zero_max_suggestions() {
    let matcher = create_matcher();
    let criteria = RecommendationMatchingCriteria {
        max_suggestions: 0,
        min_match_score: 0.0,
        ..Default::default()
    };

    let result = matcher
        .find_matches(&MatchingAlgorithmInput::new(create_source(), create_pool(), criteria))
        .unwrap();

    assert!(result.matches.is_empty());
    assert_eq!(result.total_candidates, 2);
}

#[test]
fn test_repeated_runs_are_identical() {
    let matcher = create_matcher();
    let input = MatchingAlgorithmInput::new(create_source(), create_pool(), criteria_with_min(0.0));

    let first = matcher.find_matches(&input).unwrap();
    let second = matcher.find_matches(&input).unwrap();

    assert_eq!(ranking(&first), ranking(&second));
    for (a, b) in first.matches.iter().zip(&second.matches) {
        assert_eq!(a.factors(), b.factors());
        assert_ne!(a.id, b.id);
    }
}

#[test]
fn test_incompatible_newsletter_scores_low() {
    let matcher = create_matcher();
    let mut cooking = create_test_newsletter("incompatible", "org-6", 1_000, &["Cooking", "Food", "Recipes"], 15.0);
    cooking.target_audience = Some(audience(45.0, 65.0, &["cooking", "food"], "UK", "London"));

    let result = matcher
        .find_matches(&MatchingAlgorithmInput::new(create_source(), vec![cooking], criteria_with_min(0.0)))
        .unwrap();

    let m = &result.matches[0];
    assert_eq!(m.category_alignment, 0.0);
    assert_eq!(m.geographic_alignment, 20.0);
    assert_eq!(m.competition_level, 90.0);
    assert!(m.match_score < 60.0);
}

#[test]
fn test_invalid_criteria_reported() {
    let matcher = create_matcher();
    let criteria = RecommendationMatchingCriteria {
        competition_weight: -0.5,
        ..Default::default()
    };

    let result = matcher.find_matches(&MatchingAlgorithmInput::new(create_source(), create_pool(), criteria));
    assert!(matches!(result, Err(MatchingError::InvalidCriteria(_))));
}

#[test]
fn test_reject_policy() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let matcher = Matcher::new(RecommendationMatchingCriteria::default(), WeightPolicy::Reject)
        .with_clock(Arc::new(FixedClock(now)));
    let criteria = RecommendationMatchingCriteria {
        category_weight: 0.9,
        ..Default::default()
    };

    let result = matcher.find_matches(&MatchingAlgorithmInput::new(create_source(), create_pool(), criteria));
    assert!(matches!(result, Err(MatchingError::InvalidCriteria(_))));
}

#[test]
fn test_input_deserializes_from_camel_case_json() {
    let input: MatchingAlgorithmInput = serde_json::from_str(
        r#"{
            "sourceNewsletter": {
                "id": "S", "organizationId": "A", "subscriberCount": 1000,
                "categories": ["marketing", "tech"], "averageOpenRate": 25,
                "isActiveForRecommendations": true
            },
            "candidateNewsletters": [{
                "id": "C1", "organizationId": "B", "subscriberCount": 150,
                "categories": ["marketing"], "averageOpenRate": 22,
                "isActiveForRecommendations": true,
                "targetAudience": { "ageRange": { "max": 40 } }
            }],
            "criteria": { "minMatchScore": 0 },
            "includeCategories": ["marketing"]
        }"#,
    )
    .unwrap();

    assert_eq!(input.criteria.category_weight, 0.25);
    assert_eq!(input.criteria.min_match_score, 0.0);
    assert_eq!(
        input.candidate_newsletters[0]
            .target_audience
            .as_ref()
            .and_then(|a| a.age_range)
            .map(|r| (r.lower(), r.upper())),
        Some((0.0, 40.0))
    );

    let result = create_matcher().find_matches(&input).unwrap();
    assert_eq!(result.matches.len(), 1);
    assert!((result.matches[0].category_alignment - 70.0).abs() < 1e-9);
}

#[test]
fn test_newsletter_missing_required_fields_is_rejected() {
    let complete = r#"{
        "id": "C1", "organizationId": "B", "subscriberCount": 150,
        "categories": ["marketing"], "averageOpenRate": 22,
        "isActiveForRecommendations": true
    }"#;
    assert!(serde_json::from_str::<Newsletter>(complete).is_ok());

    for field in [
        "subscriberCount",
        "categories",
        "averageOpenRate",
        "isActiveForRecommendations",
    ] {
        let mut value: serde_json::Value = serde_json::from_str(complete).unwrap();
        value.as_object_mut().unwrap().remove(field);
        let err = serde_json::from_value::<Newsletter>(value).unwrap_err();
        assert!(err.to_string().contains(field), "{}: {}", field, err);
    }
}

#[test]
fn test_input_with_incomplete_candidate_fails_to_deserialize() {
    let input = serde_json::from_str::<MatchingAlgorithmInput>(
        r#"{
            "sourceNewsletter": {
                "id": "S", "organizationId": "A", "subscriberCount": 1000,
                "categories": ["marketing"], "averageOpenRate": 25,
                "isActiveForRecommendations": true
            },
            "candidateNewsletters": [{
                "id": "C1", "organizationId": "B",
                "categories": ["marketing"], "isActiveForRecommendations": true
            }]
        }"#,
    );
    assert!(input.is_err());
}

#[test]
fn test_seasonal_month_follows_utc_clock() {
    let source = create_test_newsletter("S", "A", 1_000, &["Holiday Deals"], 25.0);
    let pool = vec![create_test_newsletter("C1", "B", 900, &["Finance"], 25.0)];
    let input = MatchingAlgorithmInput::new(source, pool, criteria_with_min(0.0));

    let seasonal_at = |now| {
        Matcher::with_default_criteria()
            .with_clock(Arc::new(FixedClock(now)))
            .find_matches(&input)
            .unwrap()
            .matches[0]
            .seasonal_relevance
    };

    // Last half hour of October in UTC, already November in UTC+1
    assert_eq!(seasonal_at(Utc.with_ymd_and_hms(2025, 10, 31, 23, 30, 0).unwrap()), 60.0);
    assert_eq!(seasonal_at(Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap()), 80.0);
}

#[test]
fn test_match_serializes_camel_case() {
    let result = create_matcher()
        .find_matches(&MatchingAlgorithmInput::new(create_source(), create_pool(), criteria_with_min(0.0)))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["algorithmVersion"], "1.0.0");
    assert_eq!(json["totalCandidates"], 2);
    let first = &json["matches"][0];
    assert_eq!(first["fromNewsletterId"], "source-1");
    assert_eq!(first["isAutoGenerated"], true);
    assert!(first["metadata"]["criteria"]["categoryWeight"].is_number());
}

#[tokio::test]
async fn test_batch_two_sources() {
    let source_a = create_test_newsletter("S1", "A", 1_000, &["Technology"], 25.0);
    let source_b = create_test_newsletter("S2", "B", 2_000, &["Design"], 30.0);
    let mut pool = create_pool();
    pool.push(source_a.clone());
    pool.push(source_b.clone());

    let batch = BatchMatcher::new(create_matcher()).with_max_concurrency(2);
    let overrides = CriteriaOverride {
        min_match_score: Some(0.0),
        ..Default::default()
    };

    let results = batch
        .batch_find_matches(vec![source_a.clone(), source_b.clone()], pool.clone(), Some(overrides))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    for source in [source_a, source_b] {
        let batched = results[&source.id].as_ref().unwrap();
        assert!(batched.matches.iter().all(|m| m.to_newsletter_id != source.id));

        let single = batch
            .matcher()
            .find_matches(&MatchingAlgorithmInput::new(
                source.clone(),
                pool.clone(),
                overrides.merge_over(&RecommendationMatchingCriteria::default()),
            ))
            .unwrap();
        assert_eq!(ranking(batched), ranking(&single));
    }
}

#[test]
fn test_batch_with_tokio_test_runtime() {
    let batch = BatchMatcher::new(create_matcher()).with_max_concurrency(1);
    let results = tokio_test::block_on(batch.batch_find_matches(
        vec![create_source()],
        create_pool(),
        None,
    ))
    .unwrap();

    assert!(results["source-1"].is_ok());
}

#[tokio::test]
async fn test_batch_source_timeout() {
    let batch = BatchMatcher::new(create_matcher())
        .with_source_timeout(Some(std::time::Duration::ZERO));

    let results = batch
        .batch_find_matches(vec![create_source()], create_pool(), None)
        .await
        .unwrap();

    assert!(matches!(
        results["source-1"],
        Err(MatchingError::DeadlineExceeded { .. })
    ));
}

#[test]
fn test_batch_request_and_entries_round_through_json() {
    let request: BatchRequest = serde_json::from_str(
        r#"{
            "sources": [{
                "id": "S", "organizationId": "A", "subscriberCount": 1000,
                "categories": ["tech"], "averageOpenRate": 25,
                "isActiveForRecommendations": true
            }],
            "candidates": [],
            "criteria": { "maxSuggestions": 3 }
        }"#,
    )
    .unwrap();
    assert_eq!(request.criteria.and_then(|c| c.max_suggestions), Some(3));

    let failed = BatchEntry::from(Err(MatchingError::InvalidCriteria("bad".to_string())));
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["error"], "Invalid criteria: bad");
}
