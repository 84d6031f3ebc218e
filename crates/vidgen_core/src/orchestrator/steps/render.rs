//! Render step - combines clips, narration and captions into the final
//! video(s).

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, RenderOutput, StepOutcome};
use crate::render::{order_for_variant, RenderRequest};

pub struct RenderStep {
    /// Fixed seed for the per-variant clip order.
    seed: Option<u64>,
}

impl RenderStep {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for RenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RenderStep {
    fn name(&self) -> &str {
        "Render"
    }

    fn description(&self) -> &str {
        "Render final video"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.narration.is_none() {
            return Err(StepError::invalid_input("No narration to render"));
        }
        match &state.footage {
            Some(f) if !f.clips.is_empty() => Ok(()),
            _ => Err(StepError::invalid_input("No footage to render")),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let (Some(narration), Some(footage)) = (&state.narration, &state.footage) else {
            return Err(StepError::invalid_input("Render needs narration and footage"));
        };

        let caption_path = if ctx.settings.render.burn_captions {
            state.captions.as_ref().map(|c| c.subtitle_path.clone())
        } else {
            None
        };
        let count = ctx.job_spec.video_count.max(1);
        let mut videos = Vec::with_capacity(count as usize);

        for variant in 1..=count {
            if ctx.is_cancelled() {
                return Err(StepError::Cancelled);
            }

            let clips = order_for_variant(
                &footage.clips,
                ctx.settings.render.concat_mode,
                variant,
                self.seed,
            );
            let request = RenderRequest {
                clips,
                audio_path: narration.audio_path.clone(),
                audio_duration: narration.duration_secs,
                caption_path: caption_path.clone(),
                aspect: ctx.job_spec.aspect,
                transition: ctx.settings.render.transition,
                max_clip_duration: ctx.settings.footage.max_clip_duration,
                output_path: ctx.layout.video_path(variant),
            };

            ctx.logger.info(&format!(
                "Rendering video {}/{} ({}, {} clips)",
                variant,
                count,
                request.aspect,
                request.clips.len()
            ));
            let video = ctx.collaborators.renderer.combine(&request).map_err(|e| {
                if let Some(output) = e.tool_output() {
                    ctx.logger.output_lines(output, true);
                }
                e
            })?;
            ctx.logger.info(&format!("Rendered: {}", video.display()));
            videos.push(video);
        }

        state.render = Some(RenderOutput { videos });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let Some(out) = &state.render else {
            return Err(StepError::invalid_output("Render not recorded"));
        };
        if out.videos.is_empty() {
            return Err(StepError::invalid_output("No videos rendered"));
        }
        if let Some(missing) = out.videos.iter().find(|v| !v.is_file()) {
            return Err(StepError::invalid_output(format!(
                "Rendered video missing: {}",
                missing.display()
            )));
        }
        Ok(())
    }
}
