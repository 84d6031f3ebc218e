//! Narration synthesis.
//!
//! A synthesizer turns script text into an audio file plus the word or
//! sentence boundary events that time the captions and size the footage
//! budget.

mod edge_tts;
mod error;

pub use edge_tts::{parse_voice_name, rate_to_percent, EdgeTtsSynthesizer};
pub use error::{NarrationError, NarrationResult};

use std::path::{Path, PathBuf};

use crate::models::{narration_duration_ms, SpeechEvent};

/// What to say and how.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    /// Voice name; a `-Male`/`-Female` suffix is tolerated.
    pub voice: String,
    /// Speaking rate, 1.0 = normal.
    pub rate: f64,
}

/// Synthesized audio with its timing events.
#[derive(Debug, Clone)]
pub struct Narration {
    pub audio_path: PathBuf,
    pub events: Vec<SpeechEvent>,
}

impl Narration {
    /// Narration length in seconds (end of the last event).
    pub fn duration_secs(&self) -> f64 {
        narration_duration_ms(&self.events) / 1000.0
    }
}

/// Produces narration audio and timing.
///
/// Implementations may return `NarrationError::NoTimingEvents` for a
/// degenerate result; the caller decides whether to retry.
pub trait NarrationSynthesizer: Send + Sync {
    fn synthesize(&self, request: &SynthesisRequest, audio_path: &Path) -> NarrationResult<Narration>;
}
