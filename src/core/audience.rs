use std::collections::BTreeSet;

use crate::models::{NumericRange, TargetAudience};

/// Score returned when no audience dimension can be compared
pub const NEUTRAL_AUDIENCE_OVERLAP: f64 = 50.0;

/// Overlap (0-100) between two declared target audiences
///
/// Age range, interests and income range are each compared only when both
/// sides declare them; the result is the mean over the dimensions compared.
pub fn target_audience_overlap(source: &TargetAudience, candidate: &TargetAudience) -> f64 {
    let mut total = 0.0;
    let mut compared = 0u32;

    if let (Some(a), Some(b)) = (&source.age_range, &candidate.age_range) {
        total += range_overlap(a, b);
        compared += 1;
    }

    if let (Some(a), Some(b)) = (&source.interests, &candidate.interests) {
        total += set_overlap(a, b);
        compared += 1;
    }

    if let (Some(a), Some(b)) = (&source.income_range, &candidate.income_range) {
        total += range_overlap(a, b);
        compared += 1;
    }

    if compared == 0 {
        return NEUTRAL_AUDIENCE_OVERLAP;
    }

    total / f64::from(compared)
}

/// Overlapping length as a percentage of the combined span; 0 when disjoint or touching
#[inline]
pub fn range_overlap(a: &NumericRange, b: &NumericRange) -> f64 {
    let (min1, max1) = (a.lower(), a.upper());
    let (min2, max2) = (b.lower(), b.upper());

    let overlap_start = min1.max(min2);
    let overlap_end = max1.min(max2);

    if overlap_start >= overlap_end {
        return 0.0;
    }

    let span = max1.max(max2) - min1.min(min2);
    (overlap_end - overlap_start) / span * 100.0
}

/// Jaccard similarity of two sets scaled to 0-100; 0 if either is empty
#[inline]
pub fn set_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    jaccard(a, b) * 100.0
}

/// |A ∩ B| / |A ∪ B|, or 0 when either set is empty
#[inline]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}
