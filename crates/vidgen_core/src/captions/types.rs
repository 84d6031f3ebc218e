//! Caption data structures.

use serde::{Deserialize, Serialize};

use crate::config::CaptionSettings;

/// One timed caption line.
///
/// Offsets are `f64` milliseconds; rounding to the output format happens at
/// write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    /// 1-based position in the track.
    pub index: usize,
    pub start_ms: f64,
    pub end_ms: f64,
    pub text: String,
}

impl CaptionCue {
    /// Create a cue, bumping a degenerate span to 1ms so `start < end` holds.
    pub fn new(index: usize, start_ms: f64, end_ms: f64, text: impl Into<String>) -> Self {
        let end_ms = if end_ms > start_ms { end_ms } else { start_ms + 1.0 };
        Self {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }
}

/// Which strategy produced a caption track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionStrategyKind {
    /// Cues aligned to script sentences.
    SentenceAligned,
    /// Cues grouped by time window (fallback).
    TimeWindowed,
}

impl CaptionStrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SentenceAligned => "sentence-aligned",
            Self::TimeWindowed => "time-windowed",
        }
    }
}

impl std::fmt::Display for CaptionStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tunables for synchronization.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Window length for time-windowed grouping, in milliseconds.
    pub max_line_duration_ms: f64,
    /// Character-set similarity needed for a fuzzy match.
    pub fuzzy_threshold: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_line_duration_ms: 3000.0,
            fuzzy_threshold: 0.8,
        }
    }
}

impl SyncConfig {
    pub fn from_settings(settings: &CaptionSettings) -> Self {
        Self {
            max_line_duration_ms: settings.max_line_duration * 1000.0,
            fuzzy_threshold: settings.fuzzy_threshold,
        }
    }
}

/// Result of synchronization.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub cues: Vec<CaptionCue>,
    pub strategy: CaptionStrategyKind,
}

impl SyncOutcome {
    /// True when the fallback strategy produced the cues.
    pub fn is_degraded(&self) -> bool {
        self.strategy == CaptionStrategyKind::TimeWindowed
    }
}
