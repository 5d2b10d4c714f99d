use std::collections::BTreeSet;

use crate::models::Newsletter;

/// Candidates must have at least this fraction of the source's subscribers
pub const MIN_SUBSCRIBER_RATIO: f64 = 0.10;

/// Check whether a candidate may be recommended alongside `source`
///
/// This is the hard eligibility stage; scoring only sees candidates that pass.
#[inline]
pub fn is_eligible_candidate(
    candidate: &Newsletter,
    source: &Newsletter,
    exclude_organizations: &BTreeSet<String>,
    include_categories: &BTreeSet<String>,
) -> bool {
    // Never recommend a newsletter to itself
    if candidate.id == source.id {
        return false;
    }

    // Never recommend within the same organization
    if candidate.organization_id == source.organization_id {
        return false;
    }

    if exclude_organizations.contains(&candidate.organization_id) {
        return false;
    }

    if !candidate.is_active_for_recommendations {
        return false;
    }

    // Minimum audience size relative to the source
    if (candidate.subscriber_count as f64) < source.subscriber_count as f64 * MIN_SUBSCRIBER_RATIO {
        return false;
    }

    // Category restriction, when requested
    if !include_categories.is_empty()
        && candidate.categories.is_disjoint(include_categories)
    {
        return false;
    }

    true
}

/// Keep the candidates that pass every eligibility rule, preserving order
pub fn filter_candidates<'a>(
    candidates: &'a [Newsletter],
    source: &Newsletter,
    exclude_organizations: &BTreeSet<String>,
    include_categories: &BTreeSet<String>,
) -> Vec<&'a Newsletter> {
    candidates
        .iter()
        .filter(|candidate| {
            is_eligible_candidate(candidate, source, exclude_organizations, include_categories)
        })
        .collect()
}
