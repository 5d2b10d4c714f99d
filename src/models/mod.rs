// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CriteriaOverride, FactorScores, GeographicTarget, MatchMetadata, Newsletter, NumericRange,
    RecommendationMatch, RecommendationMatchingCriteria, TargetAudience, ALGORITHM_VERSION,
};
pub use requests::{BatchRequest, MatchingAlgorithmInput};
pub use responses::{BatchEntry, MatchingAlgorithmResult};
