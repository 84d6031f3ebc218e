//! Sentence-aligned captions.
//!
//! Speech event text is accumulated into a rolling buffer until the matcher
//! recognises the next script sentence; the cue then spans from the first
//! buffered event's start to the matching event's end and carries the
//! script's wording.
//!
//! Sentences are consumed strictly in order. A buffer that overshoots its
//! sentence never matches, so drift early in a narration can leave the rest
//! uncaptioned; an empty result hands over to the time-windowed fallback.

use crate::captions::matcher::{TextMatcher, TieredMatcher};
use crate::captions::split::split_sentences;
use crate::captions::types::{CaptionCue, CaptionStrategyKind};
use crate::models::SpeechEvent;

use super::CaptionStrategy;

pub struct SentenceAligned {
    matcher: Box<dyn TextMatcher>,
}

impl SentenceAligned {
    pub fn new(matcher: Box<dyn TextMatcher>) -> Self {
        Self { matcher }
    }

    /// Use the tiered matcher with the given fuzzy threshold.
    pub fn with_threshold(fuzzy_threshold: f64) -> Self {
        Self::new(Box::new(TieredMatcher::new(fuzzy_threshold)))
    }
}

impl Default for SentenceAligned {
    fn default() -> Self {
        Self::new(Box::new(TieredMatcher::default()))
    }
}

impl CaptionStrategy for SentenceAligned {
    fn kind(&self) -> CaptionStrategyKind {
        CaptionStrategyKind::SentenceAligned
    }

    fn align(&self, events: &[SpeechEvent], script: &str) -> Vec<CaptionCue> {
        let sentences = split_sentences(script);
        tracing::debug!("aligning {} speech events to {} sentences", events.len(), sentences.len());

        let mut cues = Vec::with_capacity(sentences.len());
        let mut buffer = String::new();
        let mut buffer_start: Option<f64> = None;

        for event in events {
            let Some(sentence) = sentences.get(cues.len()) else {
                break;
            };

            let start = *buffer_start.get_or_insert(event.start_ms);
            buffer.push_str(&event.text);

            if let Some(tier) = self.matcher.matches(&buffer, sentence) {
                tracing::trace!("sentence {} matched ({:?})", cues.len() + 1, tier);
                cues.push(CaptionCue::new(cues.len() + 1, start, event.end_ms, sentence.trim()));
                buffer.clear();
                buffer_start = None;
            }
        }

        if cues.len() < sentences.len() {
            tracing::debug!(
                "{} of {} sentences matched; unmatched text: '{}'",
                cues.len(),
                sentences.len(),
                buffer.trim()
            );
        }

        cues
    }
}
