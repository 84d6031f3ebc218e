//! Captions step - aligns narration timing to the script and writes the
//! caption file.

use crate::captions::{write_srt_file, Synchronizer, SyncConfig};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{CaptionsOutput, Context, JobState, StepOutcome};

pub struct CaptionsStep;

impl CaptionsStep {
    pub fn new() -> Self {
        Self
    }

    fn enabled(ctx: &Context) -> bool {
        ctx.job_spec.captions_enabled && ctx.settings.captions.enabled
    }
}

impl Default for CaptionsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CaptionsStep {
    fn name(&self) -> &str {
        "Captions"
    }

    fn description(&self) -> &str {
        "Synchronize captions to narration"
    }

    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if Self::enabled(ctx) && (state.narration.is_none() || state.script.is_none()) {
            return Err(StepError::invalid_input("Captions need both script and narration"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if !Self::enabled(ctx) {
            return Ok(StepOutcome::Skipped("captions disabled".to_string()));
        }

        let (Some(script), Some(narration)) = (&state.script, &state.narration) else {
            return Err(StepError::invalid_input("Captions need both script and narration"));
        };

        let config = SyncConfig::from_settings(&ctx.settings.captions);
        let outcome = Synchronizer::new(&config).run(&narration.events, &script.script)?;

        if outcome.is_degraded() {
            ctx.logger.warn(&format!(
                "Sentence alignment matched nothing; grouped {} events into {} time-windowed cues",
                narration.events.len(),
                outcome.cues.len()
            ));
        } else {
            ctx.logger.info(&format!(
                "Aligned {} cues to script sentences",
                outcome.cues.len()
            ));
        }

        let subtitle_path = ctx.layout.subtitle_path();
        write_srt_file(&outcome.cues, &subtitle_path)?;
        ctx.logger
            .info(&format!("Wrote captions to: {}", subtitle_path.display()));

        state.captions = Some(CaptionsOutput {
            subtitle_path,
            strategy: outcome.strategy,
            cue_count: outcome.cues.len(),
            degraded: outcome.is_degraded(),
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.captions {
            Some(out) if out.cue_count > 0 && out.subtitle_path.is_file() => Ok(()),
            Some(out) => Err(StepError::invalid_output(format!(
                "Caption file missing or empty: {}",
                out.subtitle_path.display()
            ))),
            None => Err(StepError::invalid_output("Captions not recorded")),
        }
    }
}
