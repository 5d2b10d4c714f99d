use serde::{Deserialize, Serialize};

use crate::core::validation::MatchingError;
use crate::models::domain::RecommendationMatch;

/// Result of one matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingAlgorithmResult {
    /// Sorted by `match_score`, highest first
    pub matches: Vec<RecommendationMatch>,
    /// Candidates that survived filtering
    pub total_candidates: usize,
    pub processing_time_ms: f64,
    pub algorithm_version: String,
}

/// Per-source outcome as written by the batch runner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchEntry {
    Ok(MatchingAlgorithmResult),
    Error(String),
}

impl From<Result<MatchingAlgorithmResult, MatchingError>> for BatchEntry {
    fn from(result: Result<MatchingAlgorithmResult, MatchingError>) -> Self {
        match result {
            Ok(result) => BatchEntry::Ok(result),
            Err(e) => BatchEntry::Error(e.to_string()),
        }
    }
}
