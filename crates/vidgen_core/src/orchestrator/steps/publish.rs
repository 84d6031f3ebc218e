//! Publish step - copies the finished videos, narration, captions and
//! metadata to the output directory.

use crate::jobs::publish;
use crate::models::JobMetadata;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, PublishOutput, StepOutcome};

pub struct PublishStep;

impl PublishStep {
    pub fn new() -> Self {
        Self
    }

    fn metadata(ctx: &Context, state: &JobState) -> JobMetadata {
        let (script, terms) = state
            .script
            .as_ref()
            .map(|s| (s.script.clone(), s.terms.clone()))
            .unwrap_or_default();

        JobMetadata {
            topic: ctx.job_spec.topic.clone(),
            script,
            terms,
            custom_script: ctx.job_spec.has_custom_script(),
            custom_terms: ctx.job_spec.has_custom_terms(),
            source: ctx.job_spec.source,
            caption_strategy: state.captions.as_ref().map(|c| c.strategy.name().to_string()),
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

impl Default for PublishStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PublishStep {
    fn name(&self) -> &str {
        "Publish"
    }

    fn description(&self) -> &str {
        "Publish artifacts to the output folder"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.render {
            Some(r) if !r.videos.is_empty() => Ok(()),
            _ => Err(StepError::invalid_input("Nothing rendered to publish")),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let videos = state
            .render
            .as_ref()
            .map(|r| r.videos.clone())
            .unwrap_or_default();
        let audio = state.narration.as_ref().map(|n| n.audio_path.as_path());
        let subtitle = state.captions.as_ref().map(|c| c.subtitle_path.as_path());
        let metadata = Self::metadata(ctx, state);

        let published = publish(&ctx.output_dir, &videos, audio, subtitle, &metadata)?;
        for video in &published.videos {
            ctx.logger.info(&format!("Published: {}", video.display()));
        }

        state.publish = Some(PublishOutput {
            output_dir: ctx.output_dir.clone(),
            videos: published.videos,
            metadata_path: published.metadata,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.publish {
            Some(p) if p.metadata_path.is_file() && !p.videos.is_empty() => Ok(()),
            Some(_) => Err(StepError::invalid_output("Published files missing")),
            None => Err(StepError::invalid_output("Publish not recorded")),
        }
    }
}
