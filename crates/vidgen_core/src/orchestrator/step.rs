//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check that earlier steps left what this one needs
/// 2. `execute` - Perform the step's work and record it in `JobState`
/// 3. `validate_output` - Verify the recorded output (only after `Success`)
///
/// # Example
///
/// ```ignore
/// struct ScriptStep;
///
/// impl PipelineStep for ScriptStep {
///     fn name(&self) -> &str { "Script" }
///
///     fn validate_input(&self, ctx: &Context) -> StepResult<()> {
///         if ctx.job_spec.topic.trim().is_empty() {
///             return Err(StepError::invalid_input("No topic"));
///         }
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
///         state.script = Some(ScriptOutput { ... });
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
///         if state.script.is_none() {
///             return Err(StepError::invalid_output("Script not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Receives the state so a step can require earlier steps' output.
    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Returns `StepOutcome::Success` on completion, or `StepOutcome::Skipped`
    /// if the step determined it should be skipped (not an error).
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
