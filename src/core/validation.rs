use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::models::{Newsletter, RecommendationMatchingCriteria};

/// Tolerance used when checking that weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors surfaced by the matching engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchingError {
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("Invalid newsletter '{id}': {reason}")]
    InvalidNewsletter { id: String, reason: String },

    #[error("Deadline exceeded for source '{source_id}' after scoring {scored} candidates")]
    DeadlineExceeded { source_id: String, scored: usize },

    #[error("Matching task for source '{source_id}' failed: {reason}")]
    TaskFailed { source_id: String, reason: String },
}

/// What to do with a weight set that does not sum to 1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPolicy {
    /// Use the weights as given; match scores may leave [0, 100]
    #[default]
    Allow,
    /// Refuse weight sets that do not sum to 1.0
    Reject,
    /// Divide every weight by the weight sum
    Renormalize,
}

impl WeightPolicy {
    /// Validate `criteria` and return the criteria the scorer should use
    pub fn apply(
        self,
        criteria: &RecommendationMatchingCriteria,
    ) -> Result<RecommendationMatchingCriteria, MatchingError> {
        validate_criteria(criteria)?;

        let sum = criteria.weight_sum();
        match self {
            WeightPolicy::Allow => Ok(*criteria),
            WeightPolicy::Reject => {
                if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                    return Err(MatchingError::InvalidCriteria(format!(
                        "weights sum to {}, expected 1.0",
                        sum
                    )));
                }
                Ok(*criteria)
            }
            WeightPolicy::Renormalize => {
                if sum <= 0.0 {
                    return Err(MatchingError::InvalidCriteria(
                        "cannot renormalize weights that sum to zero".to_string(),
                    ));
                }
                Ok(criteria.scaled_weights(sum))
            }
        }
    }
}

/// Reject negative or non-finite weights and thresholds
pub fn validate_criteria(criteria: &RecommendationMatchingCriteria) -> Result<(), MatchingError> {
    let numeric = [
        ("categoryWeight", criteria.category_weight),
        ("audienceCompatibilityWeight", criteria.audience_compatibility_weight),
        ("performanceHistoryWeight", criteria.performance_history_weight),
        ("geographicWeight", criteria.geographic_weight),
        ("seasonalWeight", criteria.seasonal_weight),
        ("competitionWeight", criteria.competition_weight),
        ("minMatchScore", criteria.min_match_score),
    ];
    if let Some((name, value)) = numeric.iter().find(|(_, value)| !value.is_finite()) {
        return Err(MatchingError::InvalidCriteria(format!(
            "{} must be a finite number, got {}",
            name, value
        )));
    }

    criteria
        .validate()
        .map_err(|e| MatchingError::InvalidCriteria(e.to_string()))
}

/// Reject newsletters without identity or with a non-finite open rate
pub fn validate_newsletter(newsletter: &Newsletter) -> Result<(), MatchingError> {
    newsletter
        .validate()
        .map_err(|e| MatchingError::InvalidNewsletter {
            id: newsletter.id.clone(),
            reason: e.to_string(),
        })?;

    if !newsletter.average_open_rate.is_finite() {
        return Err(MatchingError::InvalidNewsletter {
            id: newsletter.id.clone(),
            reason: "averageOpenRate must be a finite number".to_string(),
        });
    }

    Ok(())
}
