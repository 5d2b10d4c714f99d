// Core algorithm exports
pub mod audience;
pub mod batch;
pub mod filters;
pub mod ids;
pub mod matcher;
pub mod scoring;
pub mod validation;

pub use audience::{range_overlap, set_overlap, target_audience_overlap};
pub use batch::{BatchMatcher, BatchResults};
pub use filters::{filter_candidates, is_eligible_candidate};
pub use ids::{Clock, FixedClock, MatchIdGenerator, SequentialIdGenerator, SystemClock, UuidGenerator};
pub use matcher::Matcher;
pub use scoring::{calculate_factor_scores, calculate_match_score};
pub use validation::{MatchingError, WeightPolicy};
