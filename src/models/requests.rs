use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::domain::{CriteriaOverride, Newsletter, RecommendationMatchingCriteria};

/// Input for a single-source matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingAlgorithmInput {
    pub source_newsletter: Newsletter,
    pub candidate_newsletters: Vec<Newsletter>,
    #[serde(default)]
    pub criteria: RecommendationMatchingCriteria,
    #[serde(default)]
    pub exclude_organizations: BTreeSet<String>,
    #[serde(default)]
    pub include_categories: BTreeSet<String>,
}

impl MatchingAlgorithmInput {
    pub fn new(
        source_newsletter: Newsletter,
        candidate_newsletters: Vec<Newsletter>,
        criteria: RecommendationMatchingCriteria,
    ) -> Self {
        Self {
            source_newsletter,
            candidate_newsletters,
            criteria,
            exclude_organizations: BTreeSet::new(),
            include_categories: BTreeSet::new(),
        }
    }

    pub fn excluding_organizations<I, S>(mut self, organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_organizations
            .extend(organizations.into_iter().map(Into::into));
        self
    }

    pub fn including_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }
}

/// Batch runner input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub sources: Vec<Newsletter>,
    pub candidates: Vec<Newsletter>,
    #[serde(default)]
    pub criteria: Option<CriteriaOverride>,
}
