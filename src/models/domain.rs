use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Version tag stamped on every result and match record
pub const ALGORITHM_VERSION: &str = "1.0.0";

/// A newsletter (or similarly shaped channel) that can be a source or a candidate.
///
/// Subscriber count, categories, open rate and the active flag have no default:
/// JSON missing any of them fails to deserialize instead of reading as zero.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "organizationId must not be empty"))]
    pub organization_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    pub subscriber_count: u64,
    pub categories: BTreeSet<String>,
    /// Percentage, nominally 0-100
    pub average_open_rate: f64,
    pub is_active_for_recommendations: bool,
    #[serde(default)]
    pub recommendation_weight: Option<f64>,
    #[serde(default)]
    pub target_audience: Option<TargetAudience>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Newsletter {
    /// Geographic targeting, if the newsletter declares any
    pub fn geographic(&self) -> Option<&GeographicTarget> {
        self.target_audience
            .as_ref()
            .and_then(|audience| audience.geographic.as_ref())
    }
}

/// Declared audience of a newsletter. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudience {
    #[serde(default)]
    pub age_range: Option<NumericRange>,
    #[serde(default)]
    pub income_range: Option<NumericRange>,
    #[serde(default)]
    pub interests: Option<BTreeSet<String>>,
    #[serde(default)]
    pub geographic: Option<GeographicTarget>,
}

/// Inclusive numeric range; a missing `min` reads as 0 and a missing `max` as 100.
/// Explicit bounds are kept as given, so `max: 0` stays 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn lower(&self) -> f64 {
        self.min.unwrap_or(0.0)
    }

    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicTarget {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Weights and thresholds for one matching run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationMatchingCriteria {
    #[validate(range(min = 0.0))]
    pub category_weight: f64,
    #[validate(range(min = 0.0))]
    pub audience_compatibility_weight: f64,
    #[validate(range(min = 0.0))]
    pub performance_history_weight: f64,
    #[validate(range(min = 0.0))]
    pub geographic_weight: f64,
    #[validate(range(min = 0.0))]
    pub seasonal_weight: f64,
    #[validate(range(min = 0.0))]
    pub competition_weight: f64,
    #[validate(range(min = 0.0))]
    pub min_match_score: f64,
    pub max_suggestions: usize,
}

impl RecommendationMatchingCriteria {
    pub fn weight_sum(&self) -> f64 {
        self.weights().iter().sum()
    }

    /// The six weights in factor order
    pub fn weights(&self) -> [f64; 6] {
        [
            self.category_weight,
            self.audience_compatibility_weight,
            self.performance_history_weight,
            self.geographic_weight,
            self.seasonal_weight,
            self.competition_weight,
        ]
    }

    /// Copy of these criteria with every weight divided by `divisor`
    pub(crate) fn scaled_weights(&self, divisor: f64) -> Self {
        Self {
            category_weight: self.category_weight / divisor,
            audience_compatibility_weight: self.audience_compatibility_weight / divisor,
            performance_history_weight: self.performance_history_weight / divisor,
            geographic_weight: self.geographic_weight / divisor,
            seasonal_weight: self.seasonal_weight / divisor,
            competition_weight: self.competition_weight / divisor,
            ..*self
        }
    }
}

impl Default for RecommendationMatchingCriteria {
    fn default() -> Self {
        Self {
            category_weight: 0.25,
            audience_compatibility_weight: 0.20,
            performance_history_weight: 0.20,
            geographic_weight: 0.15,
            seasonal_weight: 0.10,
            competition_weight: 0.10,
            min_match_score: 50.0,
            max_suggestions: 10,
        }
    }
}

/// Partial criteria; any field left `None` keeps the base value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaOverride {
    #[serde(default)]
    pub category_weight: Option<f64>,
    #[serde(default)]
    pub audience_compatibility_weight: Option<f64>,
    #[serde(default)]
    pub performance_history_weight: Option<f64>,
    #[serde(default)]
    pub geographic_weight: Option<f64>,
    #[serde(default)]
    pub seasonal_weight: Option<f64>,
    #[serde(default)]
    pub competition_weight: Option<f64>,
    #[serde(default)]
    pub min_match_score: Option<f64>,
    #[serde(default)]
    pub max_suggestions: Option<usize>,
}

impl CriteriaOverride {
    pub fn merge_over(&self, base: &RecommendationMatchingCriteria) -> RecommendationMatchingCriteria {
        RecommendationMatchingCriteria {
            category_weight: self.category_weight.unwrap_or(base.category_weight),
            audience_compatibility_weight: self
                .audience_compatibility_weight
                .unwrap_or(base.audience_compatibility_weight),
            performance_history_weight: self
                .performance_history_weight
                .unwrap_or(base.performance_history_weight),
            geographic_weight: self.geographic_weight.unwrap_or(base.geographic_weight),
            seasonal_weight: self.seasonal_weight.unwrap_or(base.seasonal_weight),
            competition_weight: self.competition_weight.unwrap_or(base.competition_weight),
            min_match_score: self.min_match_score.unwrap_or(base.min_match_score),
            max_suggestions: self.max_suggestions.unwrap_or(base.max_suggestions),
        }
    }
}

/// The six factor scores for one (source, candidate) pair, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub category_alignment: f64,
    pub audience_compatibility: f64,
    pub performance_history: f64,
    pub geographic_alignment: f64,
    pub seasonal_relevance: f64,
    pub competition_level: f64,
}

impl FactorScores {
    /// The six scores in the same order as `RecommendationMatchingCriteria::weights`
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.category_alignment,
            self.audience_compatibility,
            self.performance_history,
            self.geographic_alignment,
            self.seasonal_relevance,
            self.competition_level,
        ]
    }
}

/// A scored, ranked cross-promotion suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMatch {
    pub id: String,
    pub from_newsletter_id: String,
    pub to_newsletter_id: String,
    pub match_score: f64,
    pub category_alignment: f64,
    pub audience_compatibility: f64,
    pub performance_history: f64,
    pub geographic_alignment: f64,
    pub seasonal_relevance: f64,
    pub competition_level: f64,
    pub is_auto_generated: bool,
    pub last_calculated: chrono::DateTime<chrono::Utc>,
    pub metadata: MatchMetadata,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl RecommendationMatch {
    pub fn factors(&self) -> FactorScores {
        FactorScores {
            category_alignment: self.category_alignment,
            audience_compatibility: self.audience_compatibility,
            performance_history: self.performance_history,
            geographic_alignment: self.geographic_alignment,
            seasonal_relevance: self.seasonal_relevance,
            competition_level: self.competition_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub algorithm_version: String,
    pub criteria: RecommendationMatchingCriteria,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
