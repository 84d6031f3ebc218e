//! Footage clip structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::ProviderKind;

/// A single piece of stock footage metadata returned by a search.
///
/// Identity is `source_url`: two candidates with the same URL are the same clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipCandidate {
    /// Provider that returned this candidate.
    pub provider: ProviderKind,
    /// Download URL (or local path for local materials).
    pub source_url: String,
    /// Clip length in seconds.
    pub duration: f64,
    /// Resolution width in pixels (0 if unknown).
    #[serde(default)]
    pub width: u32,
    /// Resolution height in pixels (0 if unknown).
    #[serde(default)]
    pub height: u32,
}

impl ClipCandidate {
    /// Create a candidate with unknown resolution.
    pub fn new(provider: ProviderKind, source_url: impl Into<String>, duration: f64) -> Self {
        Self {
            provider,
            source_url: source_url.into(),
            duration,
            width: 0,
            height: 0,
        }
    }

    /// Set the resolution (builder pattern).
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Duration that counts toward the render budget.
    pub fn usable_duration(&self, max_clip_duration: f64) -> f64 {
        if max_clip_duration > 0.0 {
            self.duration.min(max_clip_duration)
        } else {
            self.duration
        }
    }
}

/// A candidate paired with its quality score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: ClipCandidate,
    pub score: f64,
}

/// A clip that was fetched to local disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedClip {
    /// The candidate this file was fetched for.
    pub candidate: ClipCandidate,
    /// Local file path.
    pub path: PathBuf,
    /// Duration counted toward the render budget.
    pub usable_duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_duration_is_capped() {
        let clip = ClipCandidate::new(ProviderKind::Pexels, "https://x/1.mp4", 12.0);
        assert_eq!(clip.usable_duration(5.0), 5.0);
        assert_eq!(clip.usable_duration(20.0), 12.0);
        // Non-positive cap means "no cap"
        assert_eq!(clip.usable_duration(0.0), 12.0);
    }
}
