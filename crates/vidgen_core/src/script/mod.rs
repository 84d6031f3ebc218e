//! Script and search-term generation.
//!
//! Generation goes through an external agent command. Failures are not
//! fatal: callers fall back to a deterministic placeholder script and to
//! search terms taken from the topic.

mod agent;
mod error;
mod fallback;

pub use agent::{parse_terms_response, script_prompt, terms_prompt, AgentCommandGenerator};
pub use error::{ScriptError, ScriptResult};
pub use fallback::{fallback_script, fallback_terms};

/// Produces a narration script and footage search terms for a topic.
pub trait ScriptGenerator: Send + Sync {
    /// Write a narration script.
    fn generate_script(&self, topic: &str, language: &str) -> ScriptResult<String>;

    /// Suggest up to `count` stock-footage search terms.
    fn generate_terms(&self, topic: &str, script: &str, count: usize) -> ScriptResult<Vec<String>>;
}
