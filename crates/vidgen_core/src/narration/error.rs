//! Narration error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::captions::CaptionError;
use crate::process::ProcessError;

/// Errors from narration synthesis.
#[derive(Error, Debug)]
pub enum NarrationError {
    /// Nothing to speak.
    #[error("Narration text is empty")]
    EmptyText,

    /// The synthesis tool could not be run or timed out.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The synthesis tool exited with an error.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The tool finished but wrote no audio.
    #[error("No audio written to {0}")]
    MissingAudio(PathBuf),

    /// The tool finished but produced no timing events.
    #[error("Synthesis produced no timing events")]
    NoTimingEvents,

    /// The timing file could not be read or parsed.
    #[error("Failed to read narration timing: {0}")]
    Timing(#[from] CaptionError),
}

impl NarrationError {
    pub fn command_failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Output captured from a failed tool run.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether a fresh attempt may succeed.
    ///
    /// Degenerate output and tool failures are retried; empty input and a
    /// missing program are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            NarrationError::EmptyText => false,
            NarrationError::Process(ProcessError::Spawn { .. }) => false,
            NarrationError::Process(_) => true,
            NarrationError::CommandFailed { .. } => true,
            NarrationError::MissingAudio(_) => true,
            NarrationError::NoTimingEvents => true,
            NarrationError::Timing(_) => true,
        }
    }
}

pub type NarrationResult<T> = Result<T, NarrationError>;
