//! The running selection set for one job.

use std::collections::HashSet;

use crate::models::ClipCandidate;

use super::diversity;

/// Result of offering a candidate to the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Offer {
    /// Candidate joined the selection.
    Accepted,
    /// A clip with the same URL is already selected.
    Duplicate,
    /// Rejected for being too similar to the current selection.
    TooSimilar(f64),
}

/// Ordered, duplicate-free set of accepted candidates.
///
/// Grows monotonically; `raw_found_duration` sums the full duration of every
/// accepted clip (discovery sufficiency, not render sufficiency).
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    clips: Vec<ClipCandidate>,
    urls: HashSet<String>,
    raw_found_duration: f64,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate, applying the duplicate and diversity checks.
    pub fn offer(&mut self, candidate: ClipCandidate, diversity_threshold: f64) -> Offer {
        if self.urls.contains(&candidate.source_url) {
            return Offer::Duplicate;
        }

        if diversity_threshold > 0.0 {
            let score = diversity::diversity_score(&self.clips, &candidate);
            if !diversity::meets_threshold(score, diversity_threshold) {
                return Offer::TooSimilar(score);
            }
        }

        self.raw_found_duration += candidate.duration;
        self.urls.insert(candidate.source_url.clone());
        self.clips.push(candidate);
        Offer::Accepted
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn raw_found_duration(&self) -> f64 {
        self.raw_found_duration
    }

    pub fn clips(&self) -> &[ClipCandidate] {
        &self.clips
    }

    pub fn into_clips(self) -> Vec<ClipCandidate> {
        self.clips
    }
}
