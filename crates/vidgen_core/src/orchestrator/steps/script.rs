//! Script step - produces the narration script and footage search terms.
//!
//! Supplied script or terms are used verbatim. Generation failures fall
//! back to deterministic placeholders instead of failing the job.

use crate::models::{ScriptSource, TermsSource};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, ScriptOutput, StepOutcome};
use crate::script::{fallback_script, fallback_terms};

pub struct ScriptStep;

impl ScriptStep {
    pub fn new() -> Self {
        Self
    }

    fn resolve_script(&self, ctx: &Context) -> (String, bool) {
        let spec = &ctx.job_spec;
        if let ScriptSource::Provided(text) = &spec.script {
            if !text.trim().is_empty() {
                ctx.logger.info("Using provided script");
                return (text.trim().to_string(), false);
            }
        }

        ctx.logger.info(&format!("Generating script for '{}'", spec.topic));
        match ctx.collaborators.script.generate_script(&spec.topic, &spec.language) {
            Ok(script) if !script.trim().is_empty() => (script.trim().to_string(), false),
            Ok(_) => {
                ctx.logger.warn("Script generator returned nothing, using placeholder");
                (fallback_script(&spec.topic), true)
            }
            Err(e) => {
                ctx.logger
                    .warn(&format!("Script generation failed ({}), using placeholder", e));
                (fallback_script(&spec.topic), true)
            }
        }
    }

    fn resolve_terms(&self, ctx: &Context, script: &str) -> (Vec<String>, bool) {
        let spec = &ctx.job_spec;
        if let TermsSource::Provided(terms) = &spec.terms {
            let terms: Vec<String> = terms
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !terms.is_empty() {
                ctx.logger.info(&format!("Using provided terms: {}", terms.join(", ")));
                return (terms, false);
            }
        }

        let count = ctx.settings.script.terms_count.max(1);
        match ctx
            .collaborators
            .script
            .generate_terms(&spec.topic, script, count)
        {
            Ok(terms) if !terms.is_empty() => (terms.into_iter().take(count).collect(), false),
            Ok(_) => {
                ctx.logger.warn("Terms generator returned nothing, using topic words");
                (fallback_terms(&spec.topic, count), true)
            }
            Err(e) => {
                ctx.logger
                    .warn(&format!("Terms generation failed ({}), using topic words", e));
                (fallback_terms(&spec.topic, count), true)
            }
        }
    }
}

impl Default for ScriptStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ScriptStep {
    fn name(&self) -> &str {
        "Script"
    }

    fn description(&self) -> &str {
        "Write the narration script and search terms"
    }

    fn validate_input(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        if ctx.job_spec.topic.trim().is_empty() {
            return Err(StepError::invalid_input("No topic given"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let (script, script_fallback) = self.resolve_script(ctx);
        let (terms, terms_fallback) = self.resolve_terms(ctx, &script);

        ctx.logger.info(&format!("Script: {} chars", script.chars().count()));
        ctx.logger.info(&format!("Terms: {}", terms.join(", ")));

        state.script = Some(ScriptOutput {
            script,
            terms,
            custom_script: ctx.job_spec.has_custom_script(),
            custom_terms: ctx.job_spec.has_custom_terms(),
            script_fallback,
            terms_fallback,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.script {
            Some(out) if out.script.trim().is_empty() => Err(StepError::invalid_output("Script is empty")),
            Some(out) if out.terms.is_empty() => Err(StepError::invalid_output("No search terms")),
            Some(_) => Ok(()),
            None => Err(StepError::invalid_output("Script not recorded")),
        }
    }
}
