//! Diversity scoring for incremental clip selection.
//!
//! Selection is greedy and order-dependent: the same candidates offered in a
//! different order can produce a different set. Callers fix the order
//! upstream (scorer output order) to keep results deterministic.

use crate::models::ClipCandidate;

/// Default minimum average diversity for acceptance.
pub const DEFAULT_DIVERSITY_THRESHOLD: f64 = 0.3;

const LARGE_DURATION_GAP: f64 = 10.0;
const SMALL_DURATION_GAP: f64 = 5.0;
const LARGE_GAP_WEIGHT: f64 = 0.4;
const SMALL_GAP_WEIGHT: f64 = 0.2;
const PROVIDER_WEIGHT: f64 = 0.3;
const URL_WEIGHT: f64 = 0.3;

/// Averaging many equal weights drifts below the exact threshold.
const SCORE_TOLERANCE: f64 = 1e-9;

/// Pairwise diversity between two candidates, in [0, 1].
pub fn pair_diversity(existing: &ClipCandidate, candidate: &ClipCandidate) -> f64 {
    let mut score = 0.0;

    let gap = (existing.duration - candidate.duration).abs();
    if gap > LARGE_DURATION_GAP {
        score += LARGE_GAP_WEIGHT;
    } else if gap > SMALL_DURATION_GAP {
        score += SMALL_GAP_WEIGHT;
    }

    if existing.provider != candidate.provider {
        score += PROVIDER_WEIGHT;
    }

    if existing.source_url != candidate.source_url {
        score += URL_WEIGHT;
    }

    score
}

/// Average diversity of `candidate` against every accepted clip.
///
/// Defined as 1.0 when nothing has been accepted yet.
pub fn diversity_score(accepted: &[ClipCandidate], candidate: &ClipCandidate) -> f64 {
    if accepted.is_empty() {
        return 1.0;
    }
    let total: f64 = accepted.iter().map(|a| pair_diversity(a, candidate)).sum();
    total / accepted.len() as f64
}

/// Whether a diversity score clears the threshold.
pub fn meets_threshold(score: f64, threshold: f64) -> bool {
    score + SCORE_TOLERANCE >= threshold
}

/// Whether `candidate` is diverse enough to join `accepted`.
///
/// A non-positive threshold disables the check.
pub fn accept(accepted: &[ClipCandidate], candidate: &ClipCandidate, threshold: f64) -> bool {
    if threshold <= 0.0 {
        return true;
    }
    meets_threshold(diversity_score(accepted, candidate), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;

    fn clip(provider: ProviderKind, url: &str, duration: f64) -> ClipCandidate {
        ClipCandidate::new(provider, url, duration)
    }

    #[test]
    fn first_candidate_always_accepted() {
        let c = clip(ProviderKind::Pexels, "a", 12.0);
        assert_eq!(diversity_score(&[], &c), 1.0);
        assert!(accept(&[], &c, 0.99));
    }

    #[test]
    fn pair_weights() {
        let a = clip(ProviderKind::Pexels, "a", 10.0);
        // Same provider, different URL, tiny gap
        assert!((pair_diversity(&a, &clip(ProviderKind::Pexels, "b", 11.0)) - 0.3).abs() < 1e-9);
        // Gap in (5, 10]
        assert!((pair_diversity(&a, &clip(ProviderKind::Pexels, "b", 17.0)) - 0.5).abs() < 1e-9);
        // Gap > 10 and different provider
        assert!((pair_diversity(&a, &clip(ProviderKind::Pixabay, "b", 25.0)) - 1.0).abs() < 1e-9);
        // Exact duplicate
        assert_eq!(pair_diversity(&a, &a.clone()), 0.0);
    }

    #[test]
    fn score_is_averaged() {
        let accepted = vec![
            clip(ProviderKind::Pexels, "a", 10.0),
            clip(ProviderKind::Pexels, "b", 30.0),
        ];
        let candidate = clip(ProviderKind::Pexels, "c", 12.0);
        // vs a: 0.3, vs b: 0.3 + 0.4
        assert!((diversity_score(&accepted, &candidate) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn many_distinct_urls_stay_at_threshold() {
        let accepted: Vec<ClipCandidate> = (0..7)
            .map(|i| clip(ProviderKind::Pexels, &format!("u{}", i), 12.0))
            .collect();
        let candidate = clip(ProviderKind::Pexels, "new", 12.0);
        assert!(accept(&accepted, &candidate, DEFAULT_DIVERSITY_THRESHOLD));
    }

    #[test]
    fn duplicate_rejected_at_default_threshold() {
        let accepted = vec![clip(ProviderKind::Pexels, "a", 10.0)];
        assert!(!accept(&accepted, &accepted[0], DEFAULT_DIVERSITY_THRESHOLD));
        assert!(accept(&accepted, &accepted[0], 0.0));
    }
}
