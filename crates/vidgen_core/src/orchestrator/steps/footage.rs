//! Footage step - searches for and downloads enough clips to cover the
//! narration.
//!
//! Single search or download failures are absorbed by the fetcher. The
//! step fails only when nothing at all could be downloaded, or when the
//! provider cannot search at all (missing API key).

use std::fs;

use crate::footage::{BudgetedFetcher, FetchConfig, FetchRequest};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, FootageOutput, JobState, StepOutcome};

pub struct FootageStep {
    /// Fixed shuffle seed for reproducible runs.
    seed: Option<u64>,
}

impl FootageStep {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for FootageStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FootageStep {
    fn name(&self) -> &str {
        "Footage"
    }

    fn description(&self) -> &str {
        "Find and download footage"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match (&state.script, state.narration_secs()) {
            (Some(_), Some(secs)) if secs > 0.0 => Ok(()),
            (None, _) => Err(StepError::invalid_input("No search terms")),
            _ => Err(StepError::invalid_input("Narration duration unknown")),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let terms = state
            .script
            .as_ref()
            .map(|s| s.terms.clone())
            .unwrap_or_default();
        let audio_duration = state.narration_secs().unwrap_or(0.0);

        let mut config = FetchConfig::from_settings(
            &ctx.settings.footage,
            ctx.job_spec.aspect,
            ctx.settings.render.concat_mode,
        );
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        let clips_dir = ctx.layout.clips_dir();
        fs::create_dir_all(clips_dir).map_err(|e| StepError::io_error("creating clips directory", e))?;

        ctx.logger.info(&format!(
            "Source {}: {} term(s), narration {:.1}s, target {:.1}s from at least {} clips",
            ctx.job_spec.source,
            terms.len(),
            audio_duration,
            audio_duration * config.redundancy_multiplier,
            config.min_unique_sources
        ));

        let request = FetchRequest {
            audio_duration,
            terms,
            fallback_subject: Some(ctx.job_spec.topic.clone()),
        };
        let provider = ctx.collaborators.footage.as_ref();
        let report = BudgetedFetcher::new(provider, config, clips_dir).fetch(&request, ctx.cancel_flag())?;

        let summary = format!(
            "{} clips, {:.1}s usable of {:.1}s required ({} selected, {} failed downloads, {} failed searches)",
            report.unique_sources(),
            report.downloaded_duration,
            report.required_duration,
            report.selected.len(),
            report.failed_downloads,
            report.failed_searches
        );
        if report.is_sufficient() {
            ctx.logger.info(&format!("Footage sufficient: {}", summary));
        } else {
            ctx.logger.warn(&format!("Footage pool exhausted: {}", summary));
        }
        if report.fallback_used {
            ctx.logger
                .info(&format!("Widened search with '{}'", ctx.job_spec.topic));
        }

        state.footage = Some(FootageOutput {
            source: ctx.job_spec.source,
            state: report.state,
            selected_count: report.selected.len(),
            raw_found_duration: report.raw_found_duration,
            downloaded_duration: report.downloaded_duration,
            required_duration: report.required_duration,
            failed_downloads: report.failed_downloads,
            failed_searches: report.failed_searches,
            fallback_used: report.fallback_used,
            clips: report.downloaded,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.footage {
            Some(out) if out.clips.is_empty() => Err(StepError::invalid_output("No clips downloaded")),
            Some(out) => match out.clips.iter().find(|c| !c.path.is_file()) {
                Some(missing) => Err(StepError::invalid_output(format!(
                    "Downloaded clip missing: {}",
                    missing.path.display()
                ))),
                None => Ok(()),
            },
            None => Err(StepError::invalid_output("Footage not recorded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footage::{FetchState, FootageError};
    use crate::orchestrator::testing::{narrated_state, test_context, test_context_with, StaticProvider};

    #[test]
    fn downloads_budget() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let mut state = narrated_state(30.0);

        let step = FootageStep::new().with_seed(1);
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let out = state.footage.unwrap();
        assert_eq!(out.state, FetchState::Sufficient);
        assert!(out.downloaded_duration >= 60.0);
        assert!(out.clips.len() >= 10);
    }

    #[test]
    fn empty_pool_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context_with(dir.path(), |_, c| c.footage = Box::new(StaticProvider::new(0, 12.0)));
        let mut state = narrated_state(30.0);

        let err = FootageStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Footage(FootageError::NothingDownloaded { .. })));
    }

    #[test]
    fn cancelled_fetch_is_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        ctx.cancel_handle().cancel();
        let mut state = narrated_state(30.0);

        let err = FootageStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(err.is_cancellation());
    }
}
