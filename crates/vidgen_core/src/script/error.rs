//! Script generation errors.

use thiserror::Error;

use crate::process::ProcessError;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The agent answered with nothing usable.
    #[error("Agent returned an empty response")]
    EmptyResponse,

    /// No JSON array of terms could be found in the response.
    #[error("No search terms in agent response")]
    NoTerms,
}

impl ScriptError {
    pub fn command_failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }
}

pub type ScriptResult<T> = Result<T, ScriptError>;
