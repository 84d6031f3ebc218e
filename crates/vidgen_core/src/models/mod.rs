//! Data models for vidgen.
//!
//! This module contains the core data structures shared by every stage:
//! - Enums for footage providers, aspect ratios, concat and transition modes
//! - Footage structures (clip candidates, scored candidates, downloaded clips)
//! - Speech timing events emitted by narration synthesis
//! - Job structures (spec, metadata)

mod clip;
mod enums;
mod jobs;
mod speech;

// Re-export all public types
pub use clip::{ClipCandidate, DownloadedClip, ScoredCandidate};
pub use enums::{ConcatMode, ProviderKind, TransitionMode, VideoAspect};
pub use jobs::{JobMetadata, JobSpec, ScriptSource, TermsSource};
pub use speech::{narration_duration_ms, SpeechEvent};
