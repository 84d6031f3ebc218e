//! Pipeline orchestrator for coordinating job execution.
//!
//! A job runs as a sequence of steps. Each step validates its input,
//! executes, and records its output in the shared `JobState` for the steps
//! after it.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Script     (script + search terms, with fallbacks)
//!     ├── Step: Narration  (audio + timing events, retried)
//!     ├── Step: Captions   (sentence-aligned or time-windowed cues)
//!     ├── Step: Footage    (score, select, budgeted download)
//!     ├── Step: Render     (one video per variant)
//!     └── Step: Publish    (copy artifacts + metadata)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vidgen_core::orchestrator::{JobRunner, RunOptions};
//! use vidgen_core::models::JobSpec;
//!
//! let runner = JobRunner::new(settings);
//! let outcome = runner.run(JobSpec::new("ocean conservation"), RunOptions::default());
//! println!("Videos: {:?}", outcome.videos);
//! ```

mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use runner::{JobOutcome, JobRunner, RunOptions, JOB_STATE_FILE};
pub use step::PipelineStep;
pub use steps::{CaptionsStep, FootageStep, NarrationStep, PublishStep, RenderStep, ScriptStep};
pub use types::{
    CaptionsOutput, Collaborators, Context, FootageOutput, JobState, NarrationOutput,
    ProgressCallback, PublishOutput, RenderOutput, ScriptOutput, StepOutcome,
};

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Script - generate (or accept) the script and search terms
/// 2. Narration - synthesize audio and timing, retrying degenerate output
/// 3. Captions - build the caption file (skipped when disabled)
/// 4. Footage - fetch enough diverse footage to cover the narration
/// 5. Render - combine clips, audio and captions
/// 6. Publish - copy the results to the output directory
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ScriptStep::new())
        .with_step(NarrationStep::new())
        .with_step(CaptionsStep::new())
        .with_step(FootageStep::new())
        .with_step(RenderStep::new())
        .with_step(PublishStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_order() {
        let pipeline = create_standard_pipeline();
        assert_eq!(
            pipeline.step_names(),
            vec!["Script", "Narration", "Captions", "Footage", "Render", "Publish"]
        );
    }
}
