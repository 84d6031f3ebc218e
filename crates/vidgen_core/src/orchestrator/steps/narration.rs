//! Narration step - synthesizes the script into audio plus timing events.
//!
//! Synthesis is retried with a fresh attempt when it fails transiently or
//! returns no timing events. Exhausting the attempts ends the job.

use crate::narration::{NarrationError, SynthesisRequest};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, NarrationOutput, StepOutcome};
use crate::retry::RetryPolicy;

pub struct NarrationStep {
    /// Overrides the attempt count from settings when set.
    policy: Option<RetryPolicy>,
}

impl NarrationStep {
    pub fn new() -> Self {
        Self { policy: None }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    fn policy(&self, ctx: &Context) -> RetryPolicy {
        self.policy
            .unwrap_or_else(|| RetryPolicy::new(ctx.settings.narration.max_attempts))
    }
}

impl Default for NarrationStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for NarrationStep {
    fn name(&self) -> &str {
        "Narration"
    }

    fn description(&self) -> &str {
        "Synthesize narration audio"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.script.is_none() {
            return Err(StepError::invalid_input("No script to narrate"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let script = state
            .script
            .as_ref()
            .map(|s| s.script.clone())
            .ok_or_else(|| StepError::invalid_input("No script to narrate"))?;

        let request = SynthesisRequest {
            text: script,
            voice: ctx.job_spec.voice.clone(),
            rate: ctx.settings.narration.rate,
        };
        let audio_path = ctx.layout.audio_path();
        let policy = self.policy(ctx);

        ctx.logger.info(&format!(
            "Voice {} at rate {}, up to {} attempt(s)",
            request.voice,
            request.rate,
            policy.max_attempts.max(1)
        ));

        let retried = policy.run(
            |attempt| {
                ctx.logger.info(&format!("Synthesis attempt {}", attempt));
                let result = ctx.collaborators.narrator.synthesize(&request, &audio_path);
                if let Err(e) = &result {
                    ctx.logger.warn(&format!("Attempt {} failed: {}", attempt, e));
                    if let Some(output) = e.tool_output() {
                        ctx.logger.output_lines(output, true);
                    }
                }
                result
            },
            NarrationError::is_retryable,
        );

        let narration = retried
            .result
            .map_err(|e| StepError::narration(retried.attempts, e))?;

        let duration_secs = narration.duration_secs();
        ctx.logger.info(&format!(
            "Narration: {:.2}s, {} timing events ({} attempt(s))",
            duration_secs,
            narration.events.len(),
            retried.attempts
        ));

        state.narration = Some(NarrationOutput {
            audio_path: narration.audio_path,
            events: narration.events,
            duration_secs,
            attempts: retried.attempts,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let Some(out) = &state.narration else {
            return Err(StepError::invalid_output("Narration not recorded"));
        };
        if out.events.is_empty() {
            return Err(StepError::invalid_output("Narration has no timing events"));
        }
        if !out.audio_path.is_file() {
            return Err(StepError::invalid_output(format!(
                "Narration audio missing: {}",
                out.audio_path.display()
            )));
        }
        if out.duration_secs <= 0.0 {
            return Err(StepError::invalid_output("Narration has zero duration"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::steps::ScriptStep;
    use crate::orchestrator::testing::{test_context_with, FakeNarrator};
    use std::time::Duration;

    fn no_delay() -> RetryPolicy {
        RetryPolicy::new(3).with_delay(Duration::ZERO)
    }

    #[test]
    fn retries_degenerate_output() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context_with(dir.path(), |_, c| c.narrator = Box::new(FakeNarrator::failing(2)));
        let mut state = JobState::new("job");
        ScriptStep::new().execute(&ctx, &mut state).unwrap();

        let step = NarrationStep::new().with_retry_policy(no_delay());
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let out = state.narration.unwrap();
        assert_eq!(out.attempts, 3);
        assert_eq!(out.events.len(), 8);
        assert!((out.duration_secs - 3.2).abs() < 1e-9);
    }

    #[test]
    fn exhausted_attempts_fail_step() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context_with(dir.path(), |_, c| c.narrator = Box::new(FakeNarrator::failing(5)));
        let mut state = JobState::new("job");
        ScriptStep::new().execute(&ctx, &mut state).unwrap();

        let err = NarrationStep::new()
            .with_retry_policy(no_delay())
            .execute(&ctx, &mut state)
            .unwrap_err();

        assert!(matches!(
            err,
            StepError::Narration {
                attempts: 3,
                source: NarrationError::NoTimingEvents
            }
        ));
        assert!(state.narration.is_none());
    }

    #[test]
    fn requires_script() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context_with(dir.path(), |_, _| {});
        let state = JobState::new("job");
        assert!(NarrationStep::new().validate_input(&ctx, &state).is_err());
    }
}
