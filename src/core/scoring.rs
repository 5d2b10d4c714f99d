use crate::core::audience::{jaccard, target_audience_overlap, NEUTRAL_AUDIENCE_OVERLAP};
use crate::models::{FactorScores, Newsletter, RecommendationMatchingCriteria};

/// Score used when geographic data cannot be compared
pub const NEUTRAL_GEOGRAPHIC_SCORE: f64 = 50.0;

/// Category keywords that mark a newsletter as seasonal
const SEASONAL_KEYWORDS: [&str; 4] = ["seasonal", "holiday", "events", "weather"];

/// 0-based month indexes (Nov through Mar) when seasonal content peaks
const SEASONAL_PEAK_MONTHS: [u32; 5] = [10, 11, 0, 1, 2];

/// Compute all six factor scores for a (source, candidate) pair
///
/// `month0` is the 0-based month of the scoring run (January = 0); it only
/// affects seasonal relevance.
pub fn calculate_factor_scores(
    source: &Newsletter,
    candidate: &Newsletter,
    month0: u32,
) -> FactorScores {
    let category_alignment = calculate_category_alignment(source, candidate);

    FactorScores {
        category_alignment,
        audience_compatibility: calculate_audience_compatibility(source, candidate),
        performance_history: calculate_performance_history(candidate),
        geographic_alignment: calculate_geographic_alignment(source, candidate),
        seasonal_relevance: calculate_seasonal_relevance(source, candidate, month0),
        competition_level: competition_from_alignment(category_alignment),
    }
}

/// Combine factor scores into a match score, rounded to 2 decimals
///
/// score = category      * categoryWeight
///       + audience      * audienceCompatibilityWeight
///       + performance   * performanceHistoryWeight
///       + geographic    * geographicWeight
///       + seasonal      * seasonalWeight
///       + competition   * competitionWeight
///
/// No clamping: weights that do not sum to 1.0 can push the score outside [0, 100].
pub fn calculate_match_score(factors: &FactorScores, criteria: &RecommendationMatchingCriteria) -> f64 {
    let weighted: f64 = factors
        .as_array()
        .iter()
        .zip(criteria.weights())
        .map(|(score, weight)| score * weight)
        .sum();

    round_to_cents(weighted)
}

#[inline]
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[inline]
fn bounded(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Category alignment (0-100)
/// Jaccard similarity plus a 0.2 bonus when any category is shared, scaled by 100
#[inline]
pub fn calculate_category_alignment(source: &Newsletter, candidate: &Newsletter) -> f64 {
    if source.categories.is_empty() || candidate.categories.is_empty() {
        return 0.0;
    }

    let similarity = jaccard(&source.categories, &candidate.categories);
    let shared_bonus = if similarity > 0.0 { 0.2 } else { 0.0 };

    ((similarity + shared_bonus) * 100.0).min(100.0)
}

/// Audience compatibility (0-100)
///
/// Up to 30 points for similar subscriber counts, 40 for similar open rates
/// and 30 for declared target-audience overlap.
#[inline]
pub fn calculate_audience_compatibility(source: &Newsletter, candidate: &Newsletter) -> f64 {
    let smaller = source.subscriber_count.min(candidate.subscriber_count) as f64;
    let larger = source.subscriber_count.max(candidate.subscriber_count) as f64;
    let size_ratio = if larger > 0.0 { smaller / larger } else { 0.0 };

    let engagement_diff = (source.average_open_rate - candidate.average_open_rate).abs();
    let engagement_compatibility = (100.0 - engagement_diff * 2.0).max(0.0);

    let audience_overlap = match (&source.target_audience, &candidate.target_audience) {
        (Some(a), Some(b)) => target_audience_overlap(a, b),
        _ => NEUTRAL_AUDIENCE_OVERLAP,
    };

    bounded(size_ratio * 30.0 + engagement_compatibility * 0.4 + audience_overlap * 0.3)
}

/// Performance history (0-100), driven by the candidate alone
///
/// performance = openRate * 0.7 + log10(subscribers + 1) * 10, doubled and
/// capped, plus 10 for an open rate above 20%.
#[inline]
pub fn calculate_performance_history(candidate: &Newsletter) -> f64 {
    let performance = candidate.average_open_rate * 0.7
        + ((candidate.subscriber_count as f64) + 1.0).log10() * 10.0;
    let performance_score = (performance * 2.0).min(100.0);

    let consistency_bonus = if candidate.average_open_rate > 20.0 { 10.0 } else { 0.0 };

    bounded(performance_score + consistency_bonus)
}

/// Geographic alignment (0-100)
///
/// Neutral 50 unless comparable. Matching countries give 80, differing 20;
/// matching regions add 20.
#[inline]
pub fn calculate_geographic_alignment(source: &Newsletter, candidate: &Newsletter) -> f64 {
    let (source_geo, candidate_geo) = match (source.geographic(), candidate.geographic()) {
        (Some(a), Some(b)) => (a, b),
        _ => return NEUTRAL_GEOGRAPHIC_SCORE,
    };

    let mut score = NEUTRAL_GEOGRAPHIC_SCORE;

    if let (Some(a), Some(b)) = (&source_geo.country, &candidate_geo.country) {
        score = if a == b { 80.0 } else { 20.0 };
    }

    if let (Some(a), Some(b)) = (&source_geo.region, &candidate_geo.region) {
        if a == b {
            score = (score + 20.0).min(100.0);
        }
    }

    score
}

/// Seasonal relevance (0-100)
/// 80 in peak months or 60 otherwise when either side is seasonal; 70 when neither is
#[inline]
pub fn calculate_seasonal_relevance(source: &Newsletter, candidate: &Newsletter, month0: u32) -> f64 {
    if !is_seasonal(source) && !is_seasonal(candidate) {
        return 70.0;
    }

    if SEASONAL_PEAK_MONTHS.contains(&month0) {
        80.0
    } else {
        60.0
    }
}

fn is_seasonal(newsletter: &Newsletter) -> bool {
    newsletter.categories.iter().any(|category| {
        let category = category.to_lowercase();
        SEASONAL_KEYWORDS
            .iter()
            .any(|keyword| category.contains(keyword))
    })
}

/// Competition level (0-100); higher means less head-to-head competition
#[inline]
pub fn calculate_competition_level(source: &Newsletter, candidate: &Newsletter) -> f64 {
    competition_from_alignment(calculate_category_alignment(source, candidate))
}

#[inline]
fn competition_from_alignment(category_alignment: f64) -> f64 {
    if category_alignment > 80.0 {
        30.0
    } else if category_alignment > 50.0 {
        60.0
    } else {
        90.0
    }
}
