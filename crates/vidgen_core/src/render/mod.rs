//! Final video rendering.
//!
//! The renderer cuts downloaded clips into segments that cover the
//! narration, normalizes them to the output aspect, concatenates them and
//! muxes the narration audio, optionally burning in the caption file.

mod error;
mod ffmpeg;
mod plan;
mod probe;

pub use error::{RenderError, RenderResult};
pub use ffmpeg::FfmpegRenderer;
pub use plan::{order_for_variant, plan_segments, planned_duration, Segment};
pub use probe::{parse_duration_output, DurationProbe};

use std::path::{Path, PathBuf};

use crate::models::{DownloadedClip, TransitionMode, VideoAspect};

/// Everything needed to render one video.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Clips in playback order.
    pub clips: Vec<DownloadedClip>,
    pub audio_path: PathBuf,
    /// Narration length in seconds.
    pub audio_duration: f64,
    /// Caption file to burn in, if any.
    pub caption_path: Option<PathBuf>,
    pub aspect: VideoAspect,
    pub transition: TransitionMode,
    /// Longest cut taken from one clip, in seconds.
    pub max_clip_duration: f64,
    pub output_path: PathBuf,
}

impl RenderRequest {
    pub fn caption_path(&self) -> Option<&Path> {
        self.caption_path.as_deref()
    }
}

/// Combines clips, narration and captions into a video file.
pub trait Renderer: Send + Sync {
    /// Render and return the path of the finished video.
    fn combine(&self, request: &RenderRequest) -> RenderResult<PathBuf>;
}
