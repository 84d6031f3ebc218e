//! Speech timing events emitted by narration synthesis.

use serde::{Deserialize, Serialize};

/// One word or sentence boundary, in emission order.
///
/// Offsets are `f64` milliseconds from the start of the narration audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechEvent {
    /// Spoken text of this boundary.
    pub text: String,
    /// Start offset in milliseconds.
    pub start_ms: f64,
    /// End offset in milliseconds.
    pub end_ms: f64,
}

impl SpeechEvent {
    /// Create a new speech event.
    pub fn new(text: impl Into<String>, start_ms: f64, end_ms: f64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }
}

/// Narration length derived from the timing events (end of the last event).
pub fn narration_duration_ms(events: &[SpeechEvent]) -> f64 {
    events.last().map(|e| e.end_ms).unwrap_or(0.0)
}
