//! Job structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{ProviderKind, VideoAspect};

/// Where the narration script comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptSource {
    /// Generate with the script collaborator.
    Generate,
    /// Use the supplied text verbatim.
    Provided(String),
}

/// Where footage search terms come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermsSource {
    /// Generate with the script collaborator.
    Generate,
    /// Use the supplied terms verbatim.
    Provided(Vec<String>),
}

/// A generation request: what one job should produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Video topic (also the fallback search subject).
    pub topic: String,
    /// Narration language code (e.g. "en-US").
    pub language: String,
    /// Voice name for synthesis.
    pub voice: String,
    /// Output aspect ratio.
    pub aspect: VideoAspect,
    /// Footage source.
    pub source: ProviderKind,
    /// Script origin.
    pub script: ScriptSource,
    /// Search term origin.
    pub terms: TermsSource,
    /// Local material paths (only used with `ProviderKind::Local`).
    #[serde(default)]
    pub materials: Vec<PathBuf>,
    /// Whether to produce captions.
    pub captions_enabled: bool,
    /// Number of video variants to render.
    pub video_count: u32,
}

impl JobSpec {
    /// Create a spec for a topic with everything else generated.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: "en-US".to_string(),
            voice: "en-US-JennyNeural".to_string(),
            aspect: VideoAspect::default(),
            source: ProviderKind::default(),
            script: ScriptSource::Generate,
            terms: TermsSource::Generate,
            materials: Vec::new(),
            captions_enabled: true,
            video_count: 1,
        }
    }

    /// Whether the script was supplied by the user.
    pub fn has_custom_script(&self) -> bool {
        matches!(self.script, ScriptSource::Provided(_))
    }

    /// Whether the search terms were supplied by the user.
    pub fn has_custom_terms(&self) -> bool {
        matches!(self.terms, TermsSource::Provided(_))
    }
}

/// Metadata persisted next to the final artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    pub topic: String,
    pub script: String,
    pub terms: Vec<String>,
    pub custom_script: bool,
    pub custom_terms: bool,
    pub source: ProviderKind,
    /// Caption strategy that produced the cue file (None if captions disabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_strategy: Option<String>,
    /// RFC 3339 timestamp.
    pub generated_at: String,
}
