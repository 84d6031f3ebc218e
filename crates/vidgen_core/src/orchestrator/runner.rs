//! Job runner: turns a `JobSpec` into a finished job.
//!
//! The runner prunes old output directories, gives the job a fresh ID and
//! its own working directory, reserves a unique output directory, builds
//! the logger and context, runs the pipeline and records the final job
//! state next to the artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use crate::config::Settings;
use crate::jobs::{cleanup_old_outputs, new_job_id, reserve_output_dir, JobLayout};
use crate::logging::{JobLogger, LogCallback, LogConfig};
use crate::models::JobSpec;

use super::errors::PipelineError;
use super::pipeline::{CancelHandle, Pipeline};
use super::types::{Collaborators, Context, JobState, ProgressCallback};
use super::{create_standard_pipeline, PipelineRunResult};

/// File the final job state is written to, inside the working directory.
pub const JOB_STATE_FILE: &str = "job_state.json";

/// Result of running a single job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Job ID (names the working directory and the job log).
    pub job_id: String,
    pub success: bool,
    /// The job was stopped through its cancel handle.
    pub cancelled: bool,
    /// Where published artifacts went (if the job got that far).
    pub output_dir: Option<PathBuf>,
    /// Published videos.
    pub videos: Vec<PathBuf>,
    /// Captions came from the time-windowed fallback.
    pub captions_degraded: bool,
    /// Error message (if failed).
    pub error: Option<String>,
    /// Step the job failed at, when a step failed.
    pub failed_step: Option<String>,
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl JobOutcome {
    /// Create a successful outcome from the final state.
    pub fn success(job_id: String, output_dir: PathBuf, state: &JobState, run_result: PipelineRunResult) -> Self {
        Self {
            job_id,
            success: true,
            cancelled: false,
            output_dir: Some(output_dir),
            videos: state
                .publish
                .as_ref()
                .map(|p| p.videos.clone())
                .unwrap_or_default(),
            captions_degraded: state.captions_degraded(),
            error: None,
            failed_step: None,
            steps_completed: run_result.steps_completed,
            steps_skipped: run_result.steps_skipped,
        }
    }

    /// Create a failed outcome.
    pub fn failure(job_id: String, error: impl Into<String>) -> Self {
        Self {
            job_id,
            success: false,
            cancelled: false,
            output_dir: None,
            videos: Vec::new(),
            captions_degraded: false,
            error: Some(error.into()),
            failed_step: None,
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        }
    }

    fn from_pipeline_error(job_id: String, error: &PipelineError) -> Self {
        let mut outcome = Self::failure(job_id, error.to_string());
        outcome.cancelled = matches!(error, PipelineError::Cancelled { .. });
        outcome.failed_step = error.step_name().map(str::to_string);
        outcome
    }
}

/// Per-run options.
#[derive(Default)]
pub struct RunOptions {
    /// Publish here instead of a timestamped folder under `output_folder`.
    pub output_dir: Option<PathBuf>,
    /// Receives every formatted job log line.
    pub log_callback: Option<LogCallback>,
    pub progress_callback: Option<ProgressCallback>,
    /// Handle the caller keeps to cancel the job.
    pub cancel: Option<CancelHandle>,
}

impl RunOptions {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_log_callback(mut self, callback: LogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }
}

/// Runs jobs through a pipeline.
///
/// # Example
///
/// ```ignore
/// let runner = JobRunner::new(settings);
/// let outcome = runner.run(JobSpec::new("ocean conservation"), RunOptions::default());
/// ```
pub struct JobRunner {
    settings: Settings,
    pipeline: Pipeline,
}

impl JobRunner {
    /// Runner with the standard pipeline.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            pipeline: create_standard_pipeline(),
        }
    }

    /// Replace the pipeline (builder pattern).
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run a job with collaborators built from the settings.
    pub fn run(&self, spec: JobSpec, options: RunOptions) -> JobOutcome {
        match Collaborators::from_settings(&self.settings, &spec) {
            Ok(collaborators) => self.run_with(spec, collaborators, options),
            Err(e) => {
                let job_id = new_job_id();
                let error = PipelineError::setup_failed(&job_id, e.to_string());
                tracing::error!("{}", error);
                JobOutcome::failure(job_id, error.to_string())
            }
        }
    }

    /// Run a job with the given collaborators.
    pub fn run_with(&self, spec: JobSpec, collaborators: Collaborators, options: RunOptions) -> JobOutcome {
        let now = Local::now();
        let job_id = new_job_id();
        let paths = &self.settings.paths;
        let output_root = Path::new(&paths.output_folder);

        if self.settings.retention.retention_days > 0 {
            match cleanup_old_outputs(output_root, self.settings.retention.retention_days, now.naive_local()) {
                Ok(removed) if !removed.is_empty() => {
                    tracing::info!("Removed {} expired output folder(s)", removed.len());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Output cleanup failed: {}", e),
            }
        }

        let layout = JobLayout::new(paths, &job_id, &self.settings.narration.audio_extension);
        if let Err(e) = layout.create() {
            let error = PipelineError::setup_failed(&job_id, e.to_string());
            return JobOutcome::failure(job_id, error.to_string());
        }

        let logger = match JobLogger::new(
            &job_id,
            &paths.logs_folder,
            LogConfig::from_settings(&self.settings.logging),
            options.log_callback,
        ) {
            Ok(l) => Arc::new(l),
            Err(e) => {
                let error = PipelineError::setup_failed(&job_id, format!("Failed to create logger: {}", e));
                return JobOutcome::failure(job_id, error.to_string());
            }
        };

        let (output_dir, reserved) = match options.output_dir {
            Some(dir) => (dir, false),
            None => match reserve_output_dir(output_root, &now) {
                Ok(dir) => (dir, true),
                Err(e) => {
                    let error = PipelineError::setup_failed(&job_id, e.to_string());
                    logger.error(&error.to_string());
                    logger.close();
                    return JobOutcome::failure(job_id, error.to_string());
                }
            },
        };

        let mut ctx = Context::new(
            spec,
            self.settings.clone(),
            &job_id,
            layout,
            output_dir.clone(),
            Arc::clone(&logger),
            collaborators,
        );
        if let Some(callback) = options.progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }
        if let Some(handle) = options.cancel {
            ctx = ctx.with_cancel_handle(handle);
        }

        logger.section(&format!("Job {}", job_id));
        logger.info(&format!("Output: {}", output_dir.display()));
        logger.info(&format!(
            "Topic: '{}' ({}, {}, source {})",
            ctx.job_spec.topic, ctx.job_spec.language, ctx.job_spec.aspect, ctx.job_spec.source
        ));

        let mut state = JobState::new(&job_id);
        let outcome = match self.pipeline.run(&ctx, &mut state) {
            Ok(run_result) => {
                logger.success(&format!("Job completed: {}", output_dir.display()));
                if state.captions_degraded() {
                    logger.warn("Captions were produced by the time-windowed fallback");
                }
                JobOutcome::success(job_id.clone(), output_dir, &state, run_result)
            }
            Err(e) => {
                logger.error(&format!("Pipeline failed: {}", e));
                logger.show_tail("Recent tool output");
                if reserved {
                    // Only removes the reserved folder if nothing was published into it.
                    let _ = fs::remove_dir(&output_dir);
                }
                JobOutcome::from_pipeline_error(job_id.clone(), &e)
            }
        };

        write_job_state(&ctx, &state);
        logger.close();
        outcome
    }
}

/// Persist the final state in the working directory for post-mortems.
fn write_job_state(ctx: &Context, state: &JobState) {
    let path = ctx.work_dir().join(JOB_STATE_FILE);
    let result = serde_json::to_string_pretty(state)
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
    if let Err(e) = result {
        ctx.logger.warn(&format!("Could not write {}: {}", path.display(), e));
    }
}
