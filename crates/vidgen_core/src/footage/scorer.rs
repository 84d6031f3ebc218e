//! Candidate scoring by duration suitability.
//!
//! Pure functions: no I/O, no logging. Ranking is deterministic because the
//! sort is stable and ties keep their input order.

use std::cmp::Ordering;

use crate::models::{ClipCandidate, ScoredCandidate};

/// Ideal B-roll length range (seconds).
pub const IDEAL_RANGE: (f64, f64) = (10.0, 30.0);
/// Acceptable length range (seconds).
pub const ACCEPTABLE_RANGE: (f64, f64) = (8.0, 40.0);
/// Clips at least this long get the flexibility bonus.
pub const BONUS_MIN_DURATION: f64 = 15.0;

const IDEAL_SCORE: f64 = 10.0;
const ACCEPTABLE_SCORE: f64 = 5.0;
const MINIMUM_SCORE: f64 = 2.0;
const LONG_CLIP_BONUS: f64 = 3.0;

/// Pools at or below this size are never trimmed.
pub const SMALL_POOL_SIZE: usize = 10;
/// Fraction of a large pool kept after ranking.
pub const RETAIN_FRACTION: f64 = 0.8;

/// Score a single duration, or `None` if it is below the minimum.
pub fn score_duration(duration: f64, minimum_duration: f64) -> Option<f64> {
    if duration < minimum_duration {
        return None;
    }

    let base = if (IDEAL_RANGE.0..=IDEAL_RANGE.1).contains(&duration) {
        IDEAL_SCORE
    } else if (ACCEPTABLE_RANGE.0..=ACCEPTABLE_RANGE.1).contains(&duration) {
        ACCEPTABLE_SCORE
    } else {
        MINIMUM_SCORE
    };

    let bonus = if duration >= BONUS_MIN_DURATION {
        LONG_CLIP_BONUS
    } else {
        0.0
    };

    Some(base + bonus)
}

/// Score candidates and order them by descending score.
///
/// Candidates shorter than `minimum_duration` are dropped. Ties preserve
/// input order.
pub fn score(candidates: &[ClipCandidate], minimum_duration: f64) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter_map(|c| {
            score_duration(c.duration, minimum_duration).map(|score| ScoredCandidate {
                candidate: c.clone(),
                score,
            })
        })
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// Number of ranked items kept for a pool of `len`.
pub fn retained_len(len: usize) -> usize {
    if len <= SMALL_POOL_SIZE {
        return len;
    }
    let keep = (len as f64 * RETAIN_FRACTION).ceil() as usize;
    keep.max(SMALL_POOL_SIZE).min(len)
}

/// Apply the post-scoring retention policy to an already ranked list.
pub fn retain_top(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let keep = retained_len(scored.len());
    scored.truncate(keep);
    scored
}

/// Score, rank and trim a search result in one go.
pub fn rank(candidates: &[ClipCandidate], minimum_duration: f64) -> Vec<ClipCandidate> {
    retain_top(score(candidates, minimum_duration))
        .into_iter()
        .map(|s| s.candidate)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;

    fn clip(url: &str, duration: f64) -> ClipCandidate {
        ClipCandidate::new(ProviderKind::Pexels, url, duration)
    }

    #[test]
    fn duration_buckets() {
        assert_eq!(score_duration(12.0, 5.0), Some(10.0));
        assert_eq!(score_duration(20.0, 5.0), Some(13.0));
        assert_eq!(score_duration(9.0, 5.0), Some(5.0));
        assert_eq!(score_duration(35.0, 5.0), Some(8.0));
        assert_eq!(score_duration(6.0, 5.0), Some(2.0));
        assert_eq!(score_duration(60.0, 5.0), Some(5.0));
        assert_eq!(score_duration(4.9, 5.0), None);
    }

    #[test]
    fn bucket_edges_are_inclusive() {
        assert_eq!(score_duration(10.0, 5.0), Some(10.0));
        assert_eq!(score_duration(30.0, 5.0), Some(13.0));
        assert_eq!(score_duration(8.0, 5.0), Some(5.0));
        assert_eq!(score_duration(40.0, 5.0), Some(8.0));
        assert_eq!(score_duration(5.0, 5.0), Some(2.0));
    }

    #[test]
    fn score_orders_descending_and_drops_short() {
        let input = vec![clip("a", 6.0), clip("b", 3.0), clip("c", 20.0), clip("d", 12.0)];
        let scored = score(&input, 5.0);
        let urls: Vec<&str> = scored.iter().map(|s| s.candidate.source_url.as_str()).collect();
        assert_eq!(urls, vec!["c", "d", "a"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let input = vec![clip("a", 11.0), clip("b", 12.0), clip("c", 13.0)];
        let scored = score(&input, 5.0);
        let urls: Vec<&str> = scored.iter().map(|s| s.candidate.source_url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[test]
    fn rescoring_sorted_output_is_idempotent() {
        let input = vec![
            clip("a", 6.0),
            clip("b", 20.0),
            clip("c", 12.0),
            clip("d", 25.0),
            clip("e", 9.0),
        ];
        let once: Vec<ClipCandidate> = score(&input, 5.0).into_iter().map(|s| s.candidate).collect();
        let twice: Vec<ClipCandidate> = score(&once, 5.0).into_iter().map(|s| s.candidate).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn retention_policy() {
        assert_eq!(retained_len(0), 0);
        assert_eq!(retained_len(3), 3);
        assert_eq!(retained_len(10), 10);
        // 11 * 0.8 = 8.8 -> 9, floor of 10
        assert_eq!(retained_len(11), 10);
        assert_eq!(retained_len(13), 11);
        assert_eq!(retained_len(50), 40);
        assert_eq!(retained_len(51), 41);
    }

    #[test]
    fn rank_keeps_small_pools_whole() {
        let input: Vec<ClipCandidate> = (0..7).map(|i| clip(&format!("u{}", i), 6.0)).collect();
        assert_eq!(rank(&input, 5.0).len(), 7);
    }

    #[test]
    fn rank_trims_large_pools() {
        let input: Vec<ClipCandidate> = (0..20)
            .map(|i| clip(&format!("u{}", i), 6.0 + i as f64))
            .collect();
        let ranked = rank(&input, 5.0);
        assert_eq!(ranked.len(), 16);
        // The 10-30s bucket with bonus sorts first
        assert!(ranked[0].duration >= 15.0 && ranked[0].duration <= 30.0);
    }
}
