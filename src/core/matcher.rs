use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Datelike, Utc};

use crate::core::{
    filters::filter_candidates,
    ids::{Clock, MatchIdGenerator, SystemClock, UuidGenerator},
    scoring::{calculate_factor_scores, calculate_match_score},
    validation::{validate_newsletter, MatchingError, WeightPolicy},
};
use crate::models::{
    FactorScores, MatchMetadata, MatchingAlgorithmInput, MatchingAlgorithmResult, Newsletter,
    RecommendationMatch, RecommendationMatchingCriteria, ALGORITHM_VERSION,
};

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility filtering
/// 2. Six-factor scoring
/// 3. Weighted combination and thresholding
/// 4. Ranking and truncation
///
/// The matcher holds no mutable state. Clone it freely or share it behind an `Arc`.
#[derive(Clone)]
pub struct Matcher {
    default_criteria: RecommendationMatchingCriteria,
    weight_policy: WeightPolicy,
    id_generator: Arc<dyn MatchIdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Matcher {
    pub fn new(default_criteria: RecommendationMatchingCriteria, weight_policy: WeightPolicy) -> Self {
        Self {
            default_criteria,
            weight_policy,
            id_generator: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_default_criteria() -> Self {
        Self::new(RecommendationMatchingCriteria::default(), WeightPolicy::default())
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn MatchIdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Criteria callers start from before applying their own overrides
    pub fn default_criteria(&self) -> RecommendationMatchingCriteria {
        self.default_criteria
    }

    pub fn weight_policy(&self) -> WeightPolicy {
        self.weight_policy
    }

    /// Find cross-promotion partners for one source newsletter
    ///
    /// # Returns
    /// Matches sorted by score (descending, ties by candidate id), or the first
    /// validation error found in the criteria, the source or the candidates.
    pub fn find_matches(
        &self,
        input: &MatchingAlgorithmInput,
    ) -> Result<MatchingAlgorithmResult, MatchingError> {
        self.find_matches_with_deadline(input, None)
    }

    /// Same as [`Matcher::find_matches`], giving up once `deadline` has passed
    ///
    /// The deadline is checked between candidates.
    pub fn find_matches_with_deadline(
        &self,
        input: &MatchingAlgorithmInput,
        deadline: Option<Instant>,
    ) -> Result<MatchingAlgorithmResult, MatchingError> {
        let criteria = self.weight_policy.apply(&input.criteria)?;

        self.match_source(
            &input.source_newsletter,
            &input.candidate_newsletters,
            &criteria,
            &input.exclude_organizations,
            &input.include_categories,
            deadline,
        )
    }

    /// Run the pipeline with criteria that have already passed the weight policy
    pub(crate) fn match_source(
        &self,
        source: &Newsletter,
        candidates: &[Newsletter],
        criteria: &RecommendationMatchingCriteria,
        exclude_organizations: &BTreeSet<String>,
        include_categories: &BTreeSet<String>,
        deadline: Option<Instant>,
    ) -> Result<MatchingAlgorithmResult, MatchingError> {
        let started = Instant::now();

        validate_newsletter(source)?;
        candidates.iter().try_for_each(validate_newsletter)?;

        // Stage 1: eligibility
        let eligible = filter_candidates(candidates, source, exclude_organizations, include_categories);

        tracing::debug!(
            "Source {}: {} of {} candidates eligible (min score {}, max {})",
            source.id,
            eligible.len(),
            candidates.len(),
            criteria.min_match_score,
            criteria.max_suggestions
        );

        let now = self.clock.now();
        let month0 = now.month0();

        // Stages 2 & 3: score and threshold
        let mut matches = Vec::new();
        for (scored, candidate) in eligible.iter().enumerate() {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(MatchingError::DeadlineExceeded {
                        source_id: source.id.clone(),
                        scored,
                    });
                }
            }

            let factors = calculate_factor_scores(source, candidate, month0);
            let match_score = calculate_match_score(&factors, criteria);

            tracing::trace!("{} -> {}: score {} ({:?})", source.id, candidate.id, match_score, factors);

            if match_score >= criteria.min_match_score {
                matches.push(self.create_recommendation_match(
                    source,
                    candidate,
                    match_score,
                    factors,
                    criteria,
                    now,
                ));
            }
        }

        // Stage 4: rank by score (descending) and then by candidate id (ascending)
        matches.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.to_newsletter_id.cmp(&b.to_newsletter_id))
        });
        matches.truncate(criteria.max_suggestions);

        Ok(MatchingAlgorithmResult {
            matches,
            total_candidates: eligible.len(),
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            algorithm_version: ALGORITHM_VERSION.to_string(),
        })
    }

    /// Package a passing candidate and its factor breakdown as a match record
    fn create_recommendation_match(
        &self,
        source: &Newsletter,
        candidate: &Newsletter,
        match_score: f64,
        factors: FactorScores,
        criteria: &RecommendationMatchingCriteria,
        now: DateTime<Utc>,
    ) -> RecommendationMatch {
        RecommendationMatch {
            id: self.id_generator.next_id(&source.id, &candidate.id),
            from_newsletter_id: source.id.clone(),
            to_newsletter_id: candidate.id.clone(),
            match_score,
            category_alignment: factors.category_alignment,
            audience_compatibility: factors.audience_compatibility,
            performance_history: factors.performance_history,
            geographic_alignment: factors.geographic_alignment,
            seasonal_relevance: factors.seasonal_relevance,
            competition_level: factors.competition_level,
            is_auto_generated: true,
            last_calculated: now,
            metadata: MatchMetadata {
                algorithm_version: ALGORITHM_VERSION.to_string(),
                criteria: *criteria,
                generated_at: now,
            },
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_criteria()
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("default_criteria", &self.default_criteria)
            .field("weight_policy", &self.weight_policy)
            .finish_non_exhaustive()
    }
}
