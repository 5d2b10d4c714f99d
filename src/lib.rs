//! Crosspromo Match - cross-promotion recommendation engine for newsletters
//!
//! This library ranks candidate newsletters as cross-promotion partners for a
//! source newsletter. Candidates pass a hard eligibility filter, are scored on
//! six independent factors, and the weighted combination is thresholded,
//! ranked and truncated.

pub mod config;
pub mod core;
pub mod models;

// Re-export commonly used types
pub use crate::core::{BatchMatcher, BatchResults, Matcher, MatchingError, WeightPolicy};
pub use models::{
    CriteriaOverride, MatchingAlgorithmInput, MatchingAlgorithmResult, Newsletter,
    RecommendationMatch, RecommendationMatchingCriteria,
};

/// The canonical default criteria (weights 0.25/0.20/0.20/0.15/0.10/0.10,
/// minimum score 50, at most 10 suggestions)
pub fn default_criteria() -> RecommendationMatchingCriteria {
    RecommendationMatchingCriteria::default()
}
