//! Buffer-to-sentence matching.
//!
//! The sentence-aligned strategy asks a `TextMatcher` whether the text
//! accumulated so far is the sentence it is waiting for. `TieredMatcher`
//! tries progressively looser comparisons; a different similarity measure
//! can be swapped in behind the same trait.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_NON_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation regex should compile"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("non-word regex should compile"));
static NON_WORD_OR_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\W_]+").expect("cleanup regex should compile"));

/// Which comparison produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Identical after trimming.
    Exact,
    /// Identical after removing punctuation.
    IgnoringPunctuation,
    /// Identical after removing everything but word characters.
    WordCharsOnly,
    /// Character-set similarity at or above the threshold.
    Fuzzy,
}

/// Decides whether a rolling buffer has reached a script sentence.
pub trait TextMatcher: Send + Sync {
    fn matches(&self, buffer: &str, sentence: &str) -> Option<MatchTier>;
}

/// Exact, punctuation-free, word-only, then fuzzy comparison; first hit wins.
#[derive(Debug, Clone)]
pub struct TieredMatcher {
    pub fuzzy_threshold: f64,
}

impl Default for TieredMatcher {
    fn default() -> Self {
        Self { fuzzy_threshold: 0.8 }
    }
}

impl TieredMatcher {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }
}

impl TextMatcher for TieredMatcher {
    fn matches(&self, buffer: &str, sentence: &str) -> Option<MatchTier> {
        let buffer = buffer.trim();
        let sentence = sentence.trim();

        if buffer == sentence {
            return Some(MatchTier::Exact);
        }

        let strip_punct = |s: &str| NON_WORD_NON_SPACE.replace_all(s, "").trim().to_string();
        if strip_punct(buffer) == strip_punct(sentence) {
            return Some(MatchTier::IgnoringPunctuation);
        }

        let word_only = |s: &str| NON_WORD.replace_all(s, "").into_owned();
        if word_only(buffer) == word_only(sentence) {
            return Some(MatchTier::WordCharsOnly);
        }

        // A strict prefix is a sentence still being spoken.
        let clean_buffer = clean_for_similarity(buffer);
        let clean_sentence = clean_for_similarity(sentence);
        if clean_sentence.starts_with(&clean_buffer) && clean_sentence.len() > clean_buffer.len() {
            return None;
        }

        if char_set_similarity(&clean_buffer, &clean_sentence) >= self.fuzzy_threshold {
            return Some(MatchTier::Fuzzy);
        }

        None
    }
}

/// Lowercase and drop everything that is not a letter or digit.
fn clean_for_similarity(s: &str) -> String {
    NON_WORD_OR_UNDERSCORE.replace_all(s, "").to_lowercase()
}

/// `|A ∩ B| / |A ∪ B|` over the distinct characters of two cleaned strings.
/// Empty input scores 0.
pub fn char_set_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}
