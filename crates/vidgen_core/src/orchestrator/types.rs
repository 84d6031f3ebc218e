//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::captions::CaptionStrategyKind;
use crate::config::Settings;
use crate::footage::{create_provider, FetchState, FootageProvider, FootageResult};
use crate::jobs::JobLayout;
use crate::logging::JobLogger;
use crate::models::{DownloadedClip, JobSpec, ProviderKind, SpeechEvent};
use crate::narration::{EdgeTtsSynthesizer, NarrationSynthesizer};
use crate::render::{DurationProbe, FfmpegRenderer, Renderer};
use crate::script::{AgentCommandGenerator, ScriptGenerator};

use super::pipeline::CancelHandle;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// External collaborators a job talks to.
pub struct Collaborators {
    pub script: Box<dyn ScriptGenerator>,
    pub narrator: Box<dyn NarrationSynthesizer>,
    pub footage: Box<dyn FootageProvider>,
    pub renderer: Box<dyn Renderer>,
}

impl Collaborators {
    /// The command-line and HTTP backed defaults for a job.
    pub fn from_settings(settings: &Settings, spec: &JobSpec) -> FootageResult<Self> {
        let probe = DurationProbe::from_settings(&settings.render);
        Ok(Self {
            script: Box::new(AgentCommandGenerator::from_settings(&settings.script)),
            narrator: Box::new(EdgeTtsSynthesizer::from_settings(&settings.narration)),
            footage: create_provider(spec.source, &settings.footage, &spec.materials, &probe)?,
            renderer: Box::new(FfmpegRenderer::from_settings(&settings.render)),
        })
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains job configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// What to generate.
    pub job_spec: JobSpec,
    /// Application settings, fixed for the job's lifetime.
    pub settings: Settings,
    /// Job name/identifier.
    pub job_name: String,
    /// Paths inside the job's working directory.
    pub layout: JobLayout,
    /// Output directory for published artifacts.
    pub output_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    pub collaborators: Collaborators,
    cancel: CancelHandle,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        job_spec: JobSpec,
        settings: Settings,
        job_name: impl Into<String>,
        layout: JobLayout,
        output_dir: PathBuf,
        logger: Arc<JobLogger>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            job_spec,
            settings,
            job_name: job_name.into(),
            layout,
            output_dir,
            logger,
            collaborators,
            cancel: CancelHandle::new(),
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Share an existing cancel handle.
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = handle;
        self
    }

    /// Log progress and forward it to the callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        self.logger.progress(percent);
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Handle that cancels this job.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Flag polled by long-running operations.
    pub fn cancel_flag(&self) -> &AtomicBool {
        self.cancel.flag()
    }

    /// Job working directory.
    pub fn work_dir(&self) -> &Path {
        self.layout.work_dir()
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Each step writes its own section once; later steps read earlier ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<NarrationOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<CaptionsOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footage: Option<FootageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishOutput>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Narration length in seconds (if narration completed).
    pub fn narration_secs(&self) -> Option<f64> {
        self.narration.as_ref().map(|n| n.duration_secs)
    }

    /// True when captions came from the fallback strategy.
    pub fn captions_degraded(&self) -> bool {
        self.captions.as_ref().map(|c| c.degraded).unwrap_or(false)
    }
}

/// Output from the Script step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptOutput {
    pub script: String,
    pub terms: Vec<String>,
    /// The script was supplied rather than generated.
    pub custom_script: bool,
    /// The terms were supplied rather than generated.
    pub custom_terms: bool,
    /// A deterministic placeholder stood in for generation.
    pub script_fallback: bool,
    pub terms_fallback: bool,
}

/// Output from the Narration step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationOutput {
    pub audio_path: PathBuf,
    pub events: Vec<SpeechEvent>,
    pub duration_secs: f64,
    /// Synthesis attempts used.
    pub attempts: u32,
}

/// Output from the Captions step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionsOutput {
    pub subtitle_path: PathBuf,
    pub strategy: CaptionStrategyKind,
    pub cue_count: usize,
    /// Quality flag: the time-windowed fallback produced the cues.
    pub degraded: bool,
}

/// Output from the Footage step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootageOutput {
    pub source: ProviderKind,
    /// `Sufficient` or `Exhausted`.
    pub state: FetchState,
    pub clips: Vec<DownloadedClip>,
    pub selected_count: usize,
    pub raw_found_duration: f64,
    pub downloaded_duration: f64,
    pub required_duration: f64,
    pub failed_downloads: usize,
    pub failed_searches: usize,
    pub fallback_used: bool,
}

/// Output from the Render step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Rendered videos in the working directory, in variant order.
    pub videos: Vec<PathBuf>,
}

/// Output from the Publish step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutput {
    pub output_dir: PathBuf,
    pub videos: Vec<PathBuf>,
    pub metadata_path: PathBuf,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
